//! Board error types

use thiserror::Error;
use shared::SharedError;

/// Result type for board operations
pub type BoardResult<T> = Result<T, BoardError>;

/// Board error types
#[derive(Error, Debug)]
pub enum BoardError {
    #[error("Incomplete record at index {index}: {field}")]
    IncompleteRecord { index: usize, field: &'static str },

    #[error("Record sequence is empty")]
    EmptySequence,

    #[error("No project identifier configured")]
    MissingProject,

    #[error("Transport error: {message}")]
    Transport { message: String },

    #[error("Remote store answered HTTP {status}: {body}")]
    HttpStatus { status: u16, body: String },

    #[error("Unexpected payload format: {message}")]
    Format { message: String },

    #[error("A save is already in flight")]
    SaveInFlight,

    #[error("Save failed after retries")]
    SaveFailed,

    #[error("Record not found: {id}")]
    RecordNotFound { id: String },

    #[error("Persistence coordinator is not running")]
    CoordinatorClosed,

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Shared component error: {0}")]
    Shared(#[from] SharedError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl BoardError {
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport { message: message.into() }
    }

    pub fn format(message: impl Into<String>) -> Self {
        Self::Format { message: message.into() }
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::Config { message: message.into() }
    }

    /// Whether the failure came from talking to the remote store
    pub fn is_transport(&self) -> bool {
        matches!(self, BoardError::Transport { .. } | BoardError::HttpStatus { .. })
    }

    /// Whether the failure is a data-completeness violation
    pub fn is_validation(&self) -> bool {
        matches!(self, BoardError::IncompleteRecord { .. } | BoardError::EmptySequence)
    }
}

impl From<reqwest::Error> for BoardError {
    fn from(error: reqwest::Error) -> Self {
        BoardError::Transport { message: error.to_string() }
    }
}
