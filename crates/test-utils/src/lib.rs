//! Shared test scaffolding: in-memory record fetchers, a fixture catalogue and tracing setup.
pub mod fixtures;
pub mod memory;

pub use fixtures::FixtureStore;
pub use memory::{Call, InMemoryCollection, matches_where};

use tracing_subscriber::EnvFilter;

/// Routes `tracing` output through the test harness, filtered by `RUST_LOG`.
pub fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_env_filter(EnvFilter::from_default_env())
        .try_init();
}

