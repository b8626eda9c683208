//! Error types for paper exports

use thiserror::Error;

/// Result type alias for export operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while exporting a paper
#[derive(Error, Debug)]
pub enum Error {
    /// Rasterizing an element failed
    #[error("Rendering failed: {0}")]
    RenderError(String),

    /// Handing a file to the download sink failed
    #[error("Download failed: {0}")]
    DownloadError(String),

    /// A `data:` URL could not be decoded
    #[error("Invalid data URL: {0}")]
    InvalidDataUrl(String),

    /// Download filenames must be a single path component
    #[error("Invalid filename: {0}")]
    InvalidFilename(String),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    ConfigError(String),

    /// Filesystem error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::ConfigError(err.to_string())
    }
}
