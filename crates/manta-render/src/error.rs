//! Error types for frame rendering

use thiserror::Error;

/// Result type alias using the renderer's error type
pub type Result<T> = std::result::Result<T, RenderError>;

/// Errors that can stop a frame
///
/// Per-pixel work never fails; a ray that finds nothing is sky.
#[derive(Error, Debug)]
pub enum RenderError {
    /// Camera settings or handler buffers cannot produce a frame
    #[error("Invalid camera: {0}")]
    InvalidCamera(String),

    /// The OS refused to start a render thread
    #[error("Failed to spawn render thread: {0}")]
    ThreadSpawn(#[source] std::io::Error),

    /// A worker panicked before finishing its columns
    #[error("Render worker panicked")]
    WorkerPanicked,

    /// The frame was cancelled before completion
    #[error("Render cancelled")]
    Cancelled,

    /// Scene error
    #[error(transparent)]
    Core(#[from] manta_core::Error),
}
