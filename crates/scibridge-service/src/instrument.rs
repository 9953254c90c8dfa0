use scibridge_core::{Collection, EntityKind, FilterSpec, Record, WhereNode};
use scibridge_error::{Result, ResultExt, TracingPolicy};
use scibridge_hydrate::Hydrator;

use crate::entity::EntityService;

/// Public instruments, backed by the `Instruments` collection.
#[derive(Debug, Clone)]
pub struct InstrumentService {
    inner: EntityService,
}

impl InstrumentService {
    pub fn new(hydrator: Hydrator) -> Self {
        Self {
            inner: EntityService::new(EntityKind::Instrument, Collection::Instruments, hydrator),
        }
    }

    #[tracing::instrument(target = "scibridge-service", skip_all, fields(entity = "instrument"))]
    pub async fn find(&self, filter: &FilterSpec) -> Result<Vec<Record>> {
        self.inner.find(filter).await.emit_event(&TracingPolicy)
    }

    #[tracing::instrument(target = "scibridge-service", skip(self, filter), fields(entity = "instrument"))]
    pub async fn find_by_id(&self, id: &str, filter: &FilterSpec) -> Result<Record> {
        self.inner
            .find_by_id(id, filter)
            .await
            .emit_event(&TracingPolicy)
    }

    #[tracing::instrument(target = "scibridge-service", skip_all, fields(entity = "instrument"))]
    pub async fn count(&self, where_clause: Option<&WhereNode>) -> Result<u64> {
        self.inner.count(where_clause).await.emit_event(&TracingPolicy)
    }
}
