//! Workspace-wide error taxonomy for the catalogue bridge.
//!
//! Three families of failure exist:
//! - [`FilterError`]: the client sent a filter the bridge cannot honour. Reported as a bad
//!   request and never retried.
//! - [`FetchError`]: the backing store failed. Fatal for the whole request; no partial
//!   results are returned.
//! - [`InternalError`]: a broken invariant inside the bridge itself.
//!
//! Fields or relations without a native counterpart are not errors at all; translators drop
//! them and emit a debug event instead.
pub mod fetch;
pub mod filter;
pub mod internal;
pub mod policy;
pub mod result_ext;
pub mod severity;

// public exports
pub use fetch::FetchError;
pub use filter::FilterError;
pub use internal::InternalError;
pub use policy::ErrorPolicy;
#[cfg(feature = "tracing")]
pub use policy::TracingPolicy;
pub use result_ext::ResultExt;
pub use severity::Severity;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Clone, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Filter(#[from] FilterError),
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error(transparent)]
    Internal(#[from] InternalError),
}

impl Error {
    /// Coarse classification used by [`ErrorPolicy`] implementations.
    pub fn severity(&self) -> Severity {
        match self {
            Error::Filter(_) => Severity::Warning,
            Error::Fetch(_) => Severity::Fatal,
            Error::Internal(_) => Severity::Error,
        }
    }

    /// HTTP-style status code the request layer should answer with.
    pub fn status_code(&self) -> u16 {
        match self {
            Error::Filter(_) => 400,
            Error::Fetch(FetchError::NotFound { .. }) => 404,
            Error::Fetch(_) => 502,
            Error::Internal(_) => 500,
        }
    }

    /// Stable name of the error family, as surfaced to clients.
    pub fn name(&self) -> &'static str {
        match self {
            Error::Filter(_) => "FilterError",
            Error::Fetch(_) => "FetchError",
            Error::Internal(_) => "InternalError",
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(value: serde_json::Error) -> Self {
        Error::Filter(FilterError::Malformed(value.to_string()))
    }
}
