use thiserror::Error;

/// Error taxonomy for the client. Every variant is caught at the view
/// layer and rendered as a message; nothing is retried automatically.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("backend returned {status}: {message}")]
    Api { status: u16, message: String },

    #[error("unauthorized")]
    Unauthorized,

    #[error("not found")]
    NotFound,

    #[error("validation error: {0}")]
    Validation(String),

    #[error("malformed response: {0}")]
    Malformed(String),

    #[error("storage error: {0}")]
    Storage(#[from] std::io::Error),

    #[error("another action is already in flight")]
    Busy,
}

impl AppError {
    /// Maps a non-success HTTP status to the matching variant.
    pub fn from_status(status: u16, message: String) -> Self {
        match status {
            401 => AppError::Unauthorized,
            404 => AppError::NotFound,
            _ => AppError::Api { status, message },
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(e: serde_json::Error) -> Self {
        AppError::Malformed(e.to_string())
    }
}
