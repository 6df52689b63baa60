//! CLI error types.

use deepzoom_compute::RenderError;
use deepzoom_core::{ParseError, ViewportError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to encode frame: {0}")]
    Image(#[from] image::ImageError),

    #[error("Failed to write stats: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Render(#[from] RenderError),

    #[error(transparent)]
    Viewport(#[from] ViewportError),

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error("Zoom factor must be positive and finite, got {0}")]
    ZoomFactor(f64),
}
