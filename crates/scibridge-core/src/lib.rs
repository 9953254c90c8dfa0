//! Core data types shared by every bridge crate.
//!
//! The same [`FilterSpec`] shape is used for both dialects; only the legal field and relation
//! names differ. Entity kinds, relations and field dictionaries are fixed at compile time.
pub mod config;
pub mod entity;
pub mod fields;
pub mod filter;
pub mod native;

pub use config::{BridgeConfig, ConfigError};
pub use entity::{Collection, EntityKind, Relation};
pub use fields::FieldDictionary;
pub use filter::{FilterSpec, Inclusion, Leaf, WhereNode};

/// A record as returned by the backing store, or as produced for the public schema.
pub type Record = serde_json::Value;
