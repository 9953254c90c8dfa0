use serde_json::Value;

use scibridge_core::{Collection, EntityKind, FilterSpec, Record, WhereNode};
use scibridge_error::{Error, FetchError};
use scibridge_fetch::RecordFetcher;
use scibridge_filter::{translate, translate_where};
use scibridge_hydrate::{Hydrator, prune};

use crate::LOG_TARGET;

/// The operations every stored public entity supports.
#[derive(Debug, Clone)]
pub(crate) struct EntityService {
    kind: EntityKind,
    collection: Collection,
    hydrator: Hydrator,
}

impl EntityService {
    pub(crate) fn new(kind: EntityKind, collection: Collection, hydrator: Hydrator) -> Self {
        Self {
            kind,
            collection,
            hydrator,
        }
    }

    pub(crate) fn hydrator(&self) -> &Hydrator {
        &self.hydrator
    }

    fn fetcher(&self) -> &dyn RecordFetcher {
        self.hydrator.catalog().get(self.collection)
    }

    pub(crate) async fn find(&self, filter: &FilterSpec) -> Result<Vec<Record>, Error> {
        let native = translate(self.kind, filter)?;
        let raw = self.fetcher().find(&native).await?;
        let hydrated = self.hydrator.hydrate_all(self.kind, &raw, filter).await?;

        let mut records = prune(hydrated, self.kind, filter);
        tracing::debug!(
            target: LOG_TARGET,
            entity = %self.kind,
            fetched = raw.len(),
            kept = records.len(),
            "pruned filtered inclusions"
        );
        records.iter_mut().for_each(reset_score);
        Ok(records)
    }

    pub(crate) async fn find_by_id(&self, id: &str, filter: &FilterSpec) -> Result<Record, Error> {
        let native = translate(self.kind, filter)?;
        let raw = self
            .fetcher()
            .find_by_id(id, &native)
            .await?
            .ok_or_else(|| FetchError::NotFound {
                collection: self.collection.to_string(),
                id: id.to_string(),
            })?;
        self.hydrator.hydrate(self.kind, &raw, filter).await
    }

    pub(crate) async fn count(&self, where_clause: Option<&WhereNode>) -> Result<u64, Error> {
        let native = match where_clause {
            Some(node) => translate_where(self.kind, node)?,
            None => None,
        };
        Ok(self.fetcher().count(native.as_ref()).await?)
    }
}

/// Relevance is not computed here; every listed record gets a neutral score.
fn reset_score(record: &mut Record) {
    if let Value::Object(fields) = record {
        fields.insert("score".to_string(), Value::from(0));
    }
}
