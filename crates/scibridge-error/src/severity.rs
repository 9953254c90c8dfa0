//! How loudly a failure is reported at the request boundary.
//!
//! - Warning: the client asked for something unsupported; the bridge itself is healthy
//! - Error: a broken invariant inside the bridge
//! - Fatal: the backing store failed and the request cannot be answered
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Severity {
    Warning,
    Error,
    Fatal,
}
