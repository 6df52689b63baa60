pub mod capture;
pub mod error;
pub mod slow_zoom;

pub use capture::{FrameFormat, FrameSink};
pub use error::CliError;
pub use slow_zoom::SlowZoom;
