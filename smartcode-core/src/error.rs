//! Error types for the smartcode client.

use thiserror::Error;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Input rejected locally, before any network call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Please enter some code to review")]
    EmptyCode,

    #[error("Please describe the code you want to generate")]
    EmptyPrompt,

    #[error("File size exceeds 1MB limit")]
    FileTooLarge { size: u64 },

    #[error("Invalid file type. Allowed: {allowed}")]
    InvalidFileType { allowed: String },

    #[error("File upload is only available in Review mode")]
    UploadInGenerateMode,
}

/// Client error types organized by layer
#[derive(Debug, Error)]
pub enum Error {
    // ─────────────────────────────────────────────────────────────
    // Common/Infrastructure Errors
    // ─────────────────────────────────────────────────────────────
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    // ─────────────────────────────────────────────────────────────
    // Storage Errors
    // ─────────────────────────────────────────────────────────────
    #[error("Storage error: {0}")]
    Storage(#[from] tokio_rusqlite::Error),

    // ─────────────────────────────────────────────────────────────
    // HTTP Errors
    // ─────────────────────────────────────────────────────────────
    /// Transport failure or undecodable body.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-2xx response. `message` is the server `detail` or the action fallback.
    #[error("{message}")]
    Api { status: u16, message: String },

    // ─────────────────────────────────────────────────────────────
    // Local validation / configuration
    // ─────────────────────────────────────────────────────────────
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Configuration error: {message}")]
    Config { message: String },
}

impl Error {
    /// Text shown in the error banner for a failed `action`.
    ///
    /// Server `detail` and validation messages are shown verbatim; transport and
    /// decode failures collapse to the action's fallback string.
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            Error::Api { message, .. } => message.clone(),
            Error::Validation(v) => v.to_string(),
            _ => fallback.to_owned(),
        }
    }
}
