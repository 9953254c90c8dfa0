use futures::future::{BoxFuture, try_join_all};
use serde_json::{Value, json};

use scibridge_core::native;
use scibridge_core::{
    BridgeConfig, Collection, EntityKind, FilterSpec, Record, Relation, WhereNode,
};
use scibridge_error::{Error, InternalError};
use scibridge_fetch::Catalog;
use scibridge_filter::{pin_identity, translate};

use crate::LOG_TARGET;
use crate::mapping::{
    base_mapping, clean_pid, files_of, instrument, instrument_fields, is_present, members,
    parameters, techniques,
};
use crate::path::{HydrationPath, Step};

/// Turns native records into public ones, resolving the relations a filter includes.
///
/// Relations the raw record embeds are mapped in place; `samples`, `document` and
/// `datasets` need secondary fetches through the [`Catalog`].
#[derive(Debug, Clone)]
pub struct Hydrator {
    catalog: Catalog,
    facility: String,
}

impl Hydrator {
    pub fn new(catalog: Catalog, config: &BridgeConfig) -> Self {
        Self {
            catalog,
            facility: config.facility.clone(),
        }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Hydrates one top-level record of `kind` against the public `filter`.
    #[tracing::instrument(target = "scibridge-hydrate", skip_all, fields(entity = %kind))]
    pub async fn hydrate(
        &self,
        kind: EntityKind,
        raw: &Record,
        filter: &FilterSpec,
    ) -> Result<Record, Error> {
        self.hydrate_on(kind, raw, filter, HydrationPath::root(kind))
            .await
    }

    /// Hydrates every record concurrently, keeping their order.
    pub async fn hydrate_all(
        &self,
        kind: EntityKind,
        raws: &[Record],
        filter: &FilterSpec,
    ) -> Result<Vec<Record>, Error> {
        try_join_all(raws.iter().map(|raw| self.hydrate(kind, raw, filter))).await
    }

    fn hydrate_on<'a>(
        &'a self,
        kind: EntityKind,
        raw: &'a Record,
        filter: &'a FilterSpec,
        path: HydrationPath,
    ) -> BoxFuture<'a, Result<Record, Error>> {
        Box::pin(async move {
            let mut hydrated = match kind {
                EntityKind::Instrument => instrument_fields(Some(raw), &self.facility),
                _ => base_mapping(kind, raw)?,
            };
            for (name, scope) in filter.inclusions() {
                let (relation, next) = match path.step(kind, name) {
                    Step::Expand(relation, next) => (relation, next),
                    Step::Unknown => {
                        tracing::debug!(
                            target: LOG_TARGET,
                            entity = %kind,
                            relation = name,
                            "unknown relation left out"
                        );
                        continue;
                    }
                    Step::Revisit(relation) => {
                        tracing::debug!(
                            target: LOG_TARGET,
                            entity = %kind,
                            %relation,
                            depth = path.depth(),
                            "relation target already on the path"
                        );
                        continue;
                    }
                };
                let value = self.relation(kind, relation, raw, &scope, next).await?;
                hydrated.insert(name.to_string(), value);
            }
            Ok(Value::Object(hydrated))
        })
    }

    async fn relation(
        &self,
        kind: EntityKind,
        relation: Relation,
        raw: &Record,
        scope: &FilterSpec,
        path: HydrationPath,
    ) -> Result<Value, Error> {
        match (kind, relation) {
            (EntityKind::Dataset, Relation::Files) => Ok(Value::Array(files_of(raw))),
            (EntityKind::Dataset, Relation::Instrument) => Ok(instrument(raw, &self.facility)),
            (EntityKind::Dataset, Relation::Parameters) => Ok(parameters(raw, scope)),
            (EntityKind::Dataset, Relation::Techniques) => Ok(techniques(raw)),
            (EntityKind::Dataset, Relation::Samples) => self.samples(raw, scope).await,
            (EntityKind::Dataset, Relation::Document) => self.document(raw, scope, path).await,
            // Publications carry no scientific metadata.
            (EntityKind::Document, Relation::Parameters) => Ok(json!([])),
            (EntityKind::Document, Relation::Members) => Ok(members(raw, scope)),
            (EntityKind::Document, Relation::Datasets) => self.datasets(raw, scope, path).await,
            (kind, relation) => Err(InternalError::InvalidState(format!(
                "no hydration for `{relation}` on `{kind}`"
            ))
            .into()),
        }
    }

    /// The dataset's sample, narrowed by the scope's own conditions.
    async fn samples(&self, raw: &Record, scope: &FilterSpec) -> Result<Value, Error> {
        let Some(sample_id) = raw.get(native::SAMPLE_ID).filter(|v| is_present(v)) else {
            return Ok(json!([]));
        };
        let translated = translate(EntityKind::Sample, scope)?;
        let identity = WhereNode::leaf(Collection::Samples.id_field(), sample_id.clone());
        let filter = FilterSpec::with_where(pin_identity(identity, translated.where_clause));

        let found = self.catalog.samples().find(&filter).await?;
        let samples = found
            .iter()
            .map(|sample| base_mapping(EntityKind::Sample, sample).map(Value::Object))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Value::Array(samples))
    }

    /// First publication listing the dataset, hydrated with the nested scope.
    async fn document(
        &self,
        raw: &Record,
        scope: &FilterSpec,
        path: HydrationPath,
    ) -> Result<Value, Error> {
        let Some(pid) = raw.get(native::PID).filter(|v| is_present(v)) else {
            return Ok(json!({}));
        };
        let translated = translate(EntityKind::Document, scope)?;
        let identity = WhereNode::leaf(native::PID_ARRAY, pid.clone());
        let filter = FilterSpec::with_where(pin_identity(identity, translated.where_clause));

        let found = self.catalog.publications().find(&filter).await?;
        match found.first() {
            Some(publication) => {
                self.hydrate_on(EntityKind::Document, publication, scope, path)
                    .await
            }
            None => Ok(json!({})),
        }
    }

    /// Every dataset the publication lists, in listing order. Identifiers the store does not
    /// know, or whose dataset fails the scope, are left out.
    async fn datasets(
        &self,
        raw: &Record,
        scope: &FilterSpec,
        path: HydrationPath,
    ) -> Result<Value, Error> {
        let pids: Vec<&str> = raw
            .get(native::PID_ARRAY)
            .and_then(Value::as_array)
            .into_iter()
            .flatten()
            .filter_map(Value::as_str)
            .map(clean_pid)
            .collect();
        if pids.is_empty() {
            return Ok(json!([]));
        }
        let translated = translate(EntityKind::Dataset, scope)?;

        let lookups = pids.iter().map(|pid| {
            let filter = FilterSpec {
                where_clause: Some(pin_identity(
                    WhereNode::leaf(native::PID, *pid),
                    translated.where_clause.clone(),
                )),
                include: translated.include.clone(),
                ..FilterSpec::default()
            };
            async move {
                let found = self.catalog.datasets().find(&filter).await?;
                Ok::<_, Error>(found.into_iter().next())
            }
        });
        let found = try_join_all(lookups).await?;
        tracing::debug!(
            target: LOG_TARGET,
            listed = pids.len(),
            found = found.iter().flatten().count(),
            "resolved publication datasets"
        );

        let hydrated = try_join_all(found.iter().flatten().map(|dataset| {
            self.hydrate_on(EntityKind::Dataset, dataset, scope, path.clone())
        }))
        .await?;
        Ok(Value::Array(hydrated))
    }
}
