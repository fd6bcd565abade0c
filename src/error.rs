use std::path::PathBuf;
use std::sync::Arc;

use thiserror::Error;

/// Main application error type that encompasses all possible failure modes.
///
/// Every variant produced while validating a single document is caught at the
/// per-document boundary in the orchestrator and turned into an invalid
/// `ValidationOutcome`; only configuration errors abort the process.
#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("HTTP request failed with status code {status} for {url}")]
    HttpStatus { url: String, status: u16 },

    /// Schema or source file missing on disk. The "NoSuchFile" marker is a
    /// stable string that callers and reports match on.
    #[error("NoSuchFile: {path}")]
    FileNotFound { path: PathBuf },

    #[error("No schema found in YAML file or provided as parameter")]
    NoSchema,

    #[error("YAML parse error: {message}")]
    Parse { message: String },

    #[error("Error parsing schema {reference}: {message}")]
    Compile { reference: String, message: String },

    #[error("Error rendering report: {0}")]
    Render(String),

    #[error("Configuration error: {0}")]
    Config(String),

    /// An error surfaced from the schema cache. Concurrent callers waiting on
    /// the same compile all receive the one shared failure.
    #[error("{0}")]
    Shared(Arc<ValidationError>),
}

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, ValidationError>;
