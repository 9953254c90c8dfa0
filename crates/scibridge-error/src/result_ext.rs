use super::{ErrorPolicy, Result};

/// Extension trait for `Result` enabling policy-driven emission without
/// contaminating core control-flow with side-effects.
///
/// Services call [`ResultExt::emit_event`] on what they are about to return, so every failure
/// is reported once, at the boundary, and still reaches the caller.
pub trait ResultExt<T> {
    /// Emit the error using the provided policy and return the result unchanged
    fn emit_event(self, policy: &impl ErrorPolicy) -> Self;
}

impl<T> ResultExt<T> for Result<T> {
    fn emit_event(self, policy: &impl ErrorPolicy) -> Self {
        if let Err(ref e) = self {
            policy.emit(e);
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Error, FilterError, Severity};
    use std::sync::Mutex;

    #[derive(Default)]
    struct Recording(Mutex<Vec<String>>);

    impl ErrorPolicy for Recording {
        fn classify(&self, error: &Error) -> Severity {
            error.severity()
        }

        fn emit(&self, error: &Error) {
            self.0.lock().unwrap().push(error.to_string());
        }
    }

    #[test]
    fn emit_event_reports_errors_only() {
        let policy = Recording::default();

        let ok: Result<u8> = Ok(3);
        assert_eq!(ok.emit_event(&policy).ok(), Some(3));
        assert!(policy.0.lock().unwrap().is_empty());

        let err: Result<u8> = Err(FilterError::MissingParameterName.into());
        let err = err.emit_event(&policy);
        assert!(matches!(
            err,
            Err(Error::Filter(FilterError::MissingParameterName))
        ));
        assert_eq!(
            *policy.0.lock().unwrap(),
            vec!["Parameter name was not provided".to_string()]
        );
    }
}
