//! Public catalogue operations.
//!
//! Every `find` runs the same pipeline: translate the public filter, fetch native records,
//! hydrate them against the public filter, prune records whose filtered relations came back
//! empty and give each survivor a neutral `score`.
//!
//! ```rust,ignore
//! let config = BridgeConfig::from_env()?;
//! let services = Services::http(&config)?;
//! let filter = FilterSpec::from_json_str(r#"{"include": ["files"], "limit": 5}"#)?;
//! let datasets = services.datasets.find(&filter).await?;
//! ```
mod entity;

pub mod dataset;
pub mod document;
pub mod instrument;

pub use dataset::DatasetService;
pub use document::DocumentService;
pub use instrument::InstrumentService;

use scibridge_core::BridgeConfig;
use scibridge_error::Error;
use scibridge_fetch::Catalog;
use scibridge_hydrate::Hydrator;

pub(crate) const LOG_TARGET: &str = "scibridge-service";

/// One service per public entity, sharing a catalog.
#[derive(Debug, Clone)]
pub struct Services {
    pub datasets: DatasetService,
    pub documents: DocumentService,
    pub instruments: InstrumentService,
}

impl Services {
    pub fn new(catalog: Catalog, config: &BridgeConfig) -> Self {
        let hydrator = Hydrator::new(catalog, config);
        Self {
            datasets: DatasetService::new(hydrator.clone()),
            documents: DocumentService::new(hydrator.clone()),
            instruments: InstrumentService::new(hydrator),
        }
    }

    /// Services over the store's REST API at `config.base_url`.
    pub fn http(config: &BridgeConfig) -> Result<Self, Error> {
        let catalog = Catalog::http(config)?;
        tracing::info!(
            target: LOG_TARGET,
            base_url = %config.base_url,
            facility = %config.facility,
            "catalogue bridge ready"
        );
        Ok(Self::new(catalog, config))
    }
}
