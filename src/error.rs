//! Error types for the crawl, summarize and tool layers

use thiserror::Error;

/// Errors raised while driving a browser session
#[derive(Debug, Error)]
pub enum BrowserError {
    /// No WebDriver server accepted a new session
    #[error("Failed to start a browser session at {url}: {message}")]
    Connect { url: String, message: String },

    /// Navigation was refused or failed inside the browser
    #[error("Failed to navigate to {url}: {message}")]
    Navigation { url: String, message: String },

    /// Navigation did not finish within the per-navigation timeout
    #[error("Timed out after {secs}s navigating to {url}")]
    Timeout { url: String, secs: u64 },

    /// Any other WebDriver command failure
    #[error("Browser command failed: {0}")]
    Command(String),

    /// The process is shutting down
    #[error("Crawl cancelled by shutdown")]
    ShuttingDown,
}

/// Total crawl failure: nothing could be gathered
#[derive(Debug, Error)]
#[error("Failed to crawl {url}: {source}")]
pub struct CrawlError {
    pub url: String,
    #[source]
    pub source: BrowserError,
}

/// Errors reported by a language-model backend
#[derive(Debug, Error)]
pub enum ModelError {
    /// Transport-level failure (connect, TLS, body read)
    #[error("Model request failed: {0}")]
    Request(String),

    /// The API answered with a non-success status
    #[error("Model API error ({status}): {message}")]
    Api {
        status: u16,
        message: String,
        /// Block reason carried on the error path, if any
        block_reason: Option<String>,
    },

    /// The API answered with a body we could not decode
    #[error("Invalid model response: {0}")]
    InvalidResponse(String),
}

impl ModelError {
    /// Block reason reported alongside the failure, if the backend gave one
    pub fn block_reason(&self) -> Option<&str> {
        match self {
            ModelError::Api { block_reason, .. } => block_reason.as_deref(),
            _ => None,
        }
    }
}

/// Hard summarization failure
#[derive(Debug, Error)]
pub enum SummarizeError {
    #[error("Language model call failed: {detail}")]
    Model { detail: String },

    /// The process is shutting down before the model answered
    #[error("Summary cancelled by shutdown")]
    Cancelled,
}

/// Protocol-level errors for a tool call
#[derive(Debug, Error)]
pub enum ToolError {
    /// Malformed arguments or an unusable URL
    #[error("Invalid arguments: {0}")]
    InvalidArguments(String),

    /// The tool ran but could not produce any result
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ToolError {
    /// JSON-RPC error code for this error
    pub fn code(&self) -> i32 {
        match self {
            ToolError::InvalidArguments(_) => -32602,
            ToolError::Internal(_) => -32603,
        }
    }
}

impl From<CrawlError> for ToolError {
    fn from(err: CrawlError) -> Self {
        ToolError::Internal(err.to_string())
    }
}

impl From<SummarizeError> for ToolError {
    fn from(err: SummarizeError) -> Self {
        ToolError::Internal(err.to_string())
    }
}

/// Errors while assembling the server configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("GEMINI_API_KEY is not set; the summarizer cannot start without it")]
    MissingApiKey,
}
