//! Page context dispatch errors.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PageError {
    #[error("Tab not found: {0}")]
    TabNotFound(String),

    #[error("Page navigated away: {0}")]
    Navigated(String),

    #[error("Page context rejected the operation: {0}")]
    Rejected(String),

    #[error("Page operation timed out: {0}")]
    Timeout(String),

    #[error("Page context unavailable: {0}")]
    Unavailable(String),

    #[error("Invalid page response: {0}")]
    InvalidResponse(String),
}

impl From<serde_json::Error> for PageError {
    fn from(e: serde_json::Error) -> Self {
        PageError::InvalidResponse(e.to_string())
    }
}
