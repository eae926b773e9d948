//! CDP error types.

use thiserror::Error;

use reviewfilter_protocols::PageError;

/// `Protocol` code Chrome uses for stale or unknown node ids, among others.
pub const SERVER_ERROR_CODE: i64 = -32000;

#[derive(Debug, Error)]
pub enum CdpError {
    /// Failed to connect to Chrome.
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// Chrome not found or not running with remote debugging.
    #[error("Chrome not available at {0}. Start Chrome with: chrome --remote-debugging-port=9222")]
    ChromeNotAvailable(String),

    #[error("WebSocket error: {0}")]
    WebSocket(String),

    /// Error object returned for a command.
    #[error("CDP error: {message} (code: {code})")]
    Protocol { code: i64, message: String },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// HTTP error (for endpoint discovery).
    #[error("HTTP error: {0}")]
    Http(String),

    #[error("Page not found: {0}")]
    PageNotFound(String),

    #[error("JavaScript error: {0}")]
    JavaScript(String),

    #[error("Timeout: {0}")]
    Timeout(String),

    #[error("Session closed")]
    SessionClosed,

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl CdpError {
    /// Whether the error means a node id no longer resolves.
    pub fn is_stale_node(&self) -> bool {
        match self {
            CdpError::Protocol { code, message } => {
                *code == SERVER_ERROR_CODE
                    && (message.contains("No node with given id")
                        || message.contains("Could not find node"))
            }
            _ => false,
        }
    }

    /// Whether the cached session should be dropped after this error.
    pub fn is_connection_lost(&self) -> bool {
        matches!(
            self,
            CdpError::WebSocket(_) | CdpError::SessionClosed | CdpError::ConnectionFailed(_)
        )
    }

    /// Whether the error ends a whole apply pass instead of one element.
    ///
    /// A timed-out call means the renderer is not answering; the next
    /// element would wait just as long.
    pub fn aborts_pass(&self) -> bool {
        self.is_connection_lost() || matches!(self, CdpError::Timeout(_))
    }
}

impl From<tokio_tungstenite::tungstenite::Error> for CdpError {
    fn from(e: tokio_tungstenite::tungstenite::Error) -> Self {
        CdpError::WebSocket(e.to_string())
    }
}

impl From<reqwest::Error> for CdpError {
    fn from(e: reqwest::Error) -> Self {
        CdpError::Http(e.to_string())
    }
}

impl From<url::ParseError> for CdpError {
    fn from(e: url::ParseError) -> Self {
        CdpError::ConnectionFailed(format!("Invalid URL: {}", e))
    }
}

impl From<CdpError> for PageError {
    fn from(e: CdpError) -> Self {
        match e {
            CdpError::PageNotFound(id) => PageError::TabNotFound(id),
            CdpError::Timeout(msg) => PageError::Timeout(msg),
            CdpError::Protocol { .. } | CdpError::JavaScript(_) => {
                PageError::Rejected(e.to_string())
            }
            CdpError::Serialization(_) | CdpError::InvalidResponse(_) => {
                PageError::InvalidResponse(e.to_string())
            }
            CdpError::ConnectionFailed(_)
            | CdpError::ChromeNotAvailable(_)
            | CdpError::WebSocket(_)
            | CdpError::Http(_)
            | CdpError::SessionClosed => PageError::Unavailable(e.to_string()),
        }
    }
}
