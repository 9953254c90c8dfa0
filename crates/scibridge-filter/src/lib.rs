//! Translation of public filters into the native store's filter dialect.
//!
//! ```text
//! {"where": {"title": "x"},
//!  "include": [{"relation": "parameters", "scope": {"where": {"and": [
//!      {"name": "p"}, {"value": 5}, {"unit": "mm"}]}}}]}
//! ```
//! becomes
//! ```text
//! {"where": {"and": [{"datasetName": "x"},
//!                    {"scientificMetadata.p.valueSI": 0.005},
//!                    {"scientificMetadata.p.unitSI": "m"}]}}
//! ```
pub mod members;
pub mod merge;
pub mod parameters;
pub mod translate;

pub use members::translate_members;
pub use merge::{merge_into_parent, pin_identity};
pub use parameters::{ParameterParts, ParameterPredicate, translate_parameters};
pub use translate::{translate, translate_files, translate_where};

pub(crate) const LOG_TARGET: &str = "scibridge-filter";
