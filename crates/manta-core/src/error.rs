//! Error types for Manta

use thiserror::Error;

/// Result type alias using Manta's Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while building scenes
///
/// Distance evaluation and ray marching never fail; these only surface at
/// the edges where scenes are assembled from external input.
#[derive(Error, Debug)]
pub enum Error {
    /// Invalid parameter
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Scene description could not be parsed
    #[error("Scene description error: {0}")]
    Json(#[from] serde_json::Error),
}
