//! Render error types.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("A frame is already being rendered")]
    Busy,

    #[error("Screen size {width}x{height} has no pixels")]
    EmptyScreen { width: u32, height: u32 },

    #[error("Failed to allocate {samples} samples")]
    Allocation { samples: usize },

    #[error("Render worker panicked")]
    WorkerPanicked,

    #[error("Failed to start render thread: {0}")]
    Spawn(#[from] std::io::Error),
}
