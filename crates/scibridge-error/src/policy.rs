use super::{Error, Severity};

/// A policy for classifying and emitting errors.
///
/// Library crates should not log failures they return; the request layer installs an
/// `ErrorPolicy` at its boundary and decides how to present them.
///
/// Example
/// ```rust,ignore
/// use scibridge_error::{ErrorPolicy, Severity, Error};
///
/// struct PrintPolicy;
/// impl ErrorPolicy for PrintPolicy {
///     fn classify(&self, e: &Error) -> Severity { e.severity() }
///     fn emit(&self, e: &Error) { eprintln!("[{:?}] {e}", self.classify(e)); }
/// }
/// ```
pub trait ErrorPolicy: Send + Sync {
    fn classify(&self, error: &Error) -> Severity;

    /// Reports the error; never alters it.
    fn emit(&self, error: &Error);
}

/// Logs bad requests at `WARN` and store or internal failures at `ERROR`, with the status
/// code the request layer answers with.
#[cfg(feature = "tracing")]
#[derive(Debug, Clone, Default)]
pub struct TracingPolicy;

#[cfg(feature = "tracing")]
impl ErrorPolicy for TracingPolicy {
    fn classify(&self, error: &Error) -> Severity {
        error.severity()
    }

    fn emit(&self, error: &Error) {
        use tracing::{Level, event};

        let status = error.status_code();
        match self.classify(error) {
            Severity::Warning => event!(Level::WARN, error = %error, status, kind = error.name()),
            Severity::Error | Severity::Fatal => {
                event!(Level::ERROR, error = %error, status, kind = error.name())
            }
        }
    }
}

#[cfg(all(test, feature = "tracing"))]
mod tests {
    use super::*;
    use crate::{FetchError, FilterError, InternalError};

    #[test]
    fn tracing_policy_follows_error_severity() {
        let bad_request: Error = FilterError::UnknownUnit("furlong".into()).into();
        let store: Error = FetchError::NotFound {
            collection: "Samples".into(),
            id: "s1".into(),
        }
        .into();
        let broken: Error = InternalError::InvalidState("no hydration".into()).into();

        assert_eq!(TracingPolicy.classify(&bad_request), Severity::Warning);
        assert_eq!(TracingPolicy.classify(&store), Severity::Fatal);
        assert_eq!(TracingPolicy.classify(&broken), Severity::Error);
        // Emission without a subscriber is a no-op.
        TracingPolicy.emit(&store);
    }
}
