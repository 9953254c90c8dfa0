//! Native record → public record.
//!
//! [`Hydrator`] maps a raw record onto the public schema and resolves each relation the
//! public filter includes, fetching related records where the store keeps them apart.
//! [`prune`] then removes the records whose filtered relations came back empty.
//!
//! ```text
//! filter:  {"include": [{"relation": "samples", "scope": {"where": {"name": "x"}}}]}
//! raw:     {"pid": "a/1", "datasetName": "Crystal", "sampleId": "s1"}
//! result:  {"pid": "a/1", "title": "Crystal", "samples": [{"pid": "s1", "name": "x", ...}]}
//! ```
pub mod hydrator;
pub mod mapping;
pub mod path;
pub mod pruner;

pub use hydrator::Hydrator;
pub use mapping::{clean_pid, files_of};
pub use path::{HydrationPath, Step};
pub use pruner::{
    filter_on_primary, filter_on_secondary, inclusion_names, is_empty_relation, prune,
    prune_relation,
};

pub(crate) const LOG_TARGET: &str = "scibridge-hydrate";
