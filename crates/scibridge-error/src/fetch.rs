/// Failures raised while talking to the backing store.
#[derive(Debug, Clone, thiserror::Error)]
pub enum FetchError {
    /// Error related to network connectivity or the HTTP request itself.
    #[error("Request to {url} failed: {message}")]
    Transport { url: String, message: String },

    /// The store answered with a non-success status code.
    #[error("Store error (status {status}) for {url}")]
    Status {
        status: u16,
        url: String,
        /// Truncated body snippet for diagnostics.
        body_snippet: Option<String>,
    },

    /// The store answered, but the body did not have the expected shape.
    #[error("Failed to decode response from {url}: {message}")]
    Decode {
        url: String,
        message: String,
        body_snippet: Option<String>,
    },

    #[error("No record `{id}` in {collection}")]
    NotFound { collection: String, id: String },
}

impl FetchError {
    /// Returns a diagnostic string with contextual fields for log surfaces.
    pub fn diagnostic(&self) -> String {
        match self {
            FetchError::Status {
                body_snippet: Some(snippet),
                ..
            }
            | FetchError::Decode {
                body_snippet: Some(snippet),
                ..
            } => format!("{self}\nbody excerpt: {snippet}"),
            other => other.to_string(),
        }
    }
}
