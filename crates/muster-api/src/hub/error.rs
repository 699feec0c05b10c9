use thiserror::Error;

/// Errors from the hub backend client.
#[derive(Debug, Error)]
pub enum HubError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("invalid base URL: {0}")]
    BaseUrl(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("hub API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("parse error: {0}")]
    Parse(String),

    /// The backend understood the mutation and refused it. The message is
    /// the backend's own and is shown to the user as-is.
    #[error("{0}")]
    Rejected(String),
}
