//! Board Errors
//!
//! Errors raised by board collaborators. Only the reconciliation layer
//! sees them; everything below it works with `Option`s.

use thiserror::Error;

/// Common result type for board operations
pub type BoardResult<T> = Result<T, BoardError>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BoardError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("network error: {0}")]
    Network(String),

    #[error("HTTP {status}: {message}")]
    Http { status: u16, message: String },

    #[error("decode error: {0}")]
    Decode(String),
}

impl BoardError {
    /// Whether the board itself is gone or forbidden, as opposed to a transient failure
    pub fn is_missing_board(&self) -> bool {
        matches!(
            self,
            BoardError::NotFound(_) | BoardError::Http { status: 403 | 404, .. }
        )
    }
}

impl From<serde_json::Error> for BoardError {
    fn from(err: serde_json::Error) -> Self {
        BoardError::Decode(err.to_string())
    }
}
