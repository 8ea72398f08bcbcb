/// Errors from the external service layer.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    /// The HTTP request itself failed (network, DNS, TLS, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The service returned a non-2xx status code.
    #[error("API error ({status}): {body}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Raw response body for debugging.
        body: String,
    },

    /// An object storage operation failed.
    #[error("Storage error: {0}")]
    Storage(String),

    /// A 2xx response was missing an expected field.
    #[error("Malformed response: missing {0}")]
    MissingField(&'static str),
}
