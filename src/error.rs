//! Error types for the quote image generator

use thiserror::Error;

/// Result type alias for generator operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while measuring, rendering or shipping quote images
#[derive(Error, Debug)]
pub enum Error {
    /// A font could not be loaded or is unusable
    #[error("Font error: {0}")]
    FontError(String),

    /// A surface has the wrong geometry for the requested operation
    #[error("Surface error: {0}")]
    SurfaceError(String),

    /// The caller broke an operation's contract (e.g. empty text)
    #[error("Precondition violated: {0}")]
    PreconditionError(String),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    ConfigError(String),

    /// Malformed quote source data
    #[error("Quote source error: {0}")]
    QuoteSourceError(String),

    /// A batch worker thread died before finishing its share
    #[error("Render worker failed: {0}")]
    WorkerError(String),

    /// Posting an image failed
    #[error("Publish failed: {0}")]
    PublishError(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

#[cfg(feature = "http")]
impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Error::PublishError(err.to_string())
    }
}
