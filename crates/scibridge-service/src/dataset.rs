use scibridge_core::{Collection, EntityKind, FilterSpec, Record, WhereNode};
use scibridge_error::{FetchError, Result, ResultExt, TracingPolicy};
use scibridge_filter::translate_files;
use scibridge_hydrate::{Hydrator, files_of};

use crate::entity::EntityService;

/// Public datasets, backed by the `Datasets` collection.
#[derive(Debug, Clone)]
pub struct DatasetService {
    inner: EntityService,
}

impl DatasetService {
    pub fn new(hydrator: Hydrator) -> Self {
        Self {
            inner: EntityService::new(EntityKind::Dataset, Collection::Datasets, hydrator),
        }
    }

    /// Datasets matching `filter`, hydrated and pruned, each with `score: 0`.
    #[tracing::instrument(target = "scibridge-service", skip_all, fields(entity = "dataset"))]
    pub async fn find(&self, filter: &FilterSpec) -> Result<Vec<Record>> {
        self.inner.find(filter).await.emit_event(&TracingPolicy)
    }

    #[tracing::instrument(target = "scibridge-service", skip(self, filter), fields(entity = "dataset"))]
    pub async fn find_by_id(&self, id: &str, filter: &FilterSpec) -> Result<Record> {
        self.inner
            .find_by_id(id, filter)
            .await
            .emit_event(&TracingPolicy)
    }

    #[tracing::instrument(target = "scibridge-service", skip_all, fields(entity = "dataset"))]
    pub async fn count(&self, where_clause: Option<&WhereNode>) -> Result<u64> {
        self.inner.count(where_clause).await.emit_event(&TracingPolicy)
    }

    /// Flat file list of one dataset. A file filter narrows the blocks the store returns.
    #[tracing::instrument(target = "scibridge-service", skip(self, filter), fields(entity = "dataset"))]
    pub async fn find_files(&self, id: &str, filter: Option<&FilterSpec>) -> Result<Vec<Record>> {
        self.files(id, filter).await.emit_event(&TracingPolicy)
    }

    #[tracing::instrument(target = "scibridge-service", skip(self, where_clause), fields(entity = "dataset"))]
    pub async fn count_files(&self, id: &str, where_clause: Option<&WhereNode>) -> Result<u64> {
        let filter = where_clause.cloned().map(FilterSpec::with_where);
        self.files(id, filter.as_ref())
            .await
            .map(|files| files.len() as u64)
            .emit_event(&TracingPolicy)
    }

    async fn files(&self, id: &str, filter: Option<&FilterSpec>) -> Result<Vec<Record>> {
        let native = translate_files(filter);
        let datasets = self.inner.hydrator().catalog().datasets();
        let raw = datasets
            .find_by_id(id, &native)
            .await?
            .ok_or_else(|| FetchError::NotFound {
                collection: Collection::Datasets.to_string(),
                id: id.to_string(),
            })?;
        Ok(files_of(&raw))
    }
}
