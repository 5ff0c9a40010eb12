//! Unified error types for marketlens.
//!
//! Each variant carries a stable code prefix so callers can tell a dead browser
//! apart from a page that simply had nothing to extract.

use rmcp::model::{ErrorCode, ErrorData as McpError};

/// Unified error types for extraction runs and tool calls.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Invalid input parameters (e.g., empty URL).
    #[error("INVALID_INPUT: {0}")]
    InvalidInput(String),

    /// Input URL could not be canonicalized.
    #[error("INVALID_URL: {0}")]
    InvalidUrl(String),

    /// The browser session could not be started.
    #[error("SESSION_ERROR: {0}")]
    Session(String),

    /// The page was loaded but no product survived extraction.
    #[error("NO_PRODUCTS: no products extracted")]
    NoProducts,

    /// Page-level extraction failed (navigation, markup capture, ...).
    #[error("EXTRACT_FAILED: {0}")]
    ExtractFailed(String),

    /// Render mode is disabled in this build.
    #[error("RENDER_DISABLED")]
    RenderDisabled,

    /// Render failed.
    #[error("RENDER_FAILED: {0}")]
    RenderFailed(String),
}

impl From<Error> for McpError {
    fn from(err: Error) -> Self {
        let (code, message) = match &err {
            Error::InvalidInput(msg) => (-32602, msg.clone()),
            Error::ExtractFailed(msg) => (-32000, msg.clone()),
            Error::NoProducts => (-32001, "no products extracted".to_string()),
            Error::InvalidUrl(msg) => (-32003, msg.clone()),
            Error::Session(msg) => (-32004, msg.clone()),
            Error::RenderDisabled => (-32011, "Render mode is disabled".to_string()),
            Error::RenderFailed(msg) => (-32012, msg.clone()),
        };

        McpError { code: ErrorCode(code), message: message.into(), data: None }
    }
}
