use thiserror::Error;

/// Errors raised by the harsift host layer (file IO, parsing, arguments).
///
/// The filter and export core never returns these; malformed patterns, URLs
/// and bodies degrade to a conservative default instead.
#[derive(Error, Debug)]
pub enum HarsiftError {
    /// IO error (file not found, permission denied, etc.).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing error from invalid HAR or settings content.
    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    /// Validation error for HAR data missing required structure.
    #[error("Invalid HAR file: {0}")]
    InvalidHar(String),

    /// Invalid command-line or config arguments.
    #[error("Invalid arguments: {0}")]
    InvalidArgs(String),
}

/// Convenience result type for harsift operations.
pub type Result<T> = std::result::Result<T, HarsiftError>;
