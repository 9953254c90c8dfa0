//! Access to the native store's record collections.
//!
//! Everything above this crate talks to a [`RecordFetcher`]; [`HttpCollection`] is the
//! production implementation over the store's REST API, and tests substitute in-memory ones.
use std::sync::Arc;

use async_trait::async_trait;

use scibridge_core::{BridgeConfig, Collection, FilterSpec, Record, WhereNode};
use scibridge_error::FetchError;

pub mod http;

pub use http::HttpCollection;

pub(crate) const LOG_TARGET: &str = "scibridge-fetch";

/// Read access to one native collection. Filters are already in the native dialect.
#[async_trait]
pub trait RecordFetcher: Send + Sync {
    fn collection(&self) -> Collection;

    async fn find(&self, filter: &FilterSpec) -> Result<Vec<Record>, FetchError>;

    /// `Ok(None)` when no record carries `id`.
    async fn find_by_id(&self, id: &str, filter: &FilterSpec)
    -> Result<Option<Record>, FetchError>;

    async fn count(&self, where_clause: Option<&WhereNode>) -> Result<u64, FetchError>;
}

/// The four collections a request may touch, shared across concurrent hydration branches.
#[derive(Clone)]
pub struct Catalog {
    datasets: Arc<dyn RecordFetcher>,
    publications: Arc<dyn RecordFetcher>,
    instruments: Arc<dyn RecordFetcher>,
    samples: Arc<dyn RecordFetcher>,
}

impl std::fmt::Debug for Catalog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Catalog").finish_non_exhaustive()
    }
}

impl Catalog {
    pub fn new(
        datasets: Arc<dyn RecordFetcher>,
        publications: Arc<dyn RecordFetcher>,
        instruments: Arc<dyn RecordFetcher>,
        samples: Arc<dyn RecordFetcher>,
    ) -> Self {
        Self {
            datasets,
            publications,
            instruments,
            samples,
        }
    }

    /// HTTP fetchers for every collection, sharing one client configured from `config`.
    pub fn http(config: &BridgeConfig) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| FetchError::Transport {
                url: config.base_url.to_string(),
                message: e.to_string(),
            })?;
        let fetcher = |collection| -> Result<Arc<dyn RecordFetcher>, FetchError> {
            Ok(Arc::new(HttpCollection::new(
                client.clone(),
                config,
                collection,
            )?))
        };
        Ok(Self::new(
            fetcher(Collection::Datasets)?,
            fetcher(Collection::PublishedData)?,
            fetcher(Collection::Instruments)?,
            fetcher(Collection::Samples)?,
        ))
    }

    pub fn get(&self, collection: Collection) -> &dyn RecordFetcher {
        match collection {
            Collection::Datasets => self.datasets.as_ref(),
            Collection::PublishedData => self.publications.as_ref(),
            Collection::Instruments => self.instruments.as_ref(),
            Collection::Samples => self.samples.as_ref(),
        }
    }

    pub fn datasets(&self) -> &dyn RecordFetcher {
        self.datasets.as_ref()
    }

    pub fn publications(&self) -> &dyn RecordFetcher {
        self.publications.as_ref()
    }

    pub fn instruments(&self) -> &dyn RecordFetcher {
        self.instruments.as_ref()
    }

    pub fn samples(&self) -> &dyn RecordFetcher {
        self.samples.as_ref()
    }
}
