// src/error.rs
// =============================================================================
// Typed errors for the library-level parts of the inspector.
//
// - FetchError: the only failure that aborts a whole analysis request
// - AnalyzeError: one analyzer failed; becomes a per-key error entry
// - ScanError: the markup scanner failed (turns into an AnalyzeError)
// - ConfigError: configuration could not be read or is invalid
//
// The application layer (main.rs, CLI handlers) wraps these in anyhow.
// =============================================================================

use std::path::PathBuf;
use thiserror::Error;

/// Why fetching the target page failed.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("invalid URL '{0}'")]
    InvalidUrl(String),

    #[error("host not found: {0}")]
    HostNotFound(String),

    #[error("request timed out after {0} ms")]
    Timeout(u64),

    #[error("HTTP {0}")]
    Status(u16),

    #[error("transport error: {0}")]
    Transport(String),

    #[error("could not read response body: {0}")]
    Body(String),
}

impl FetchError {
    /// HTTP status surfaced to API callers for this failure.
    pub fn http_status(&self) -> u16 {
        match self {
            FetchError::InvalidUrl(_) | FetchError::HostNotFound(_) => 400,
            FetchError::Timeout(_) => 504,
            FetchError::Status(code) => *code,
            FetchError::Transport(_) => 502,
            FetchError::Body(_) => 500,
        }
    }

    /// Message placed in the error envelope.
    pub fn user_message(&self) -> String {
        match self {
            FetchError::InvalidUrl(_) => "Invalid URL format".to_string(),
            FetchError::HostNotFound(_) => "Host not found. Check domain name.".to_string(),
            FetchError::Status(403) => "URL not accessible or blocked.".to_string(),
            other => other.to_string(),
        }
    }
}

/// Failure reported by a single analyzer.
#[derive(Debug, Error)]
#[error("{0}")]
pub struct AnalyzeError(pub String);

impl AnalyzeError {
    pub fn new(message: impl Into<String>) -> Self {
        AnalyzeError(message.into())
    }
}

/// The markup scanner gave up on a page.
#[derive(Debug, Error)]
#[error("could not scan markup: {0}")]
pub struct ScanError(#[from] lol_html::errors::RewritingError);

impl From<ScanError> for AnalyzeError {
    fn from(e: ScanError) -> Self {
        AnalyzeError(e.to_string())
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("could not parse config file {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid configuration: {0}")]
    Invalid(String),
}
