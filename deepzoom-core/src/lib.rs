pub mod bigdecimal;
pub mod complex;
pub mod config;
pub mod error;
pub mod navigation;
pub mod pixel_rect;
pub mod precision;
pub mod presets;
pub mod viewport;
pub mod zoom_state;

pub use bigdecimal::BigDecimal;
pub use complex::{BigVec2, Vec2};
pub use config::{FractalConfig, Quality, MANDELBROT_CONFIG};
pub use error::{ParseError, ViewportError};
pub use navigation::Navigator;
pub use pixel_rect::PixelRect;
pub use precision::{calculate_extra_exponent, calculate_precision_digits, PrecisionContext};
pub use presets::{
    palette_preset, viewport_preset, ChannelMasks, PalettePreset, ViewportPreset,
    PALETTE_PRESETS, VIEWPORT_PRESETS,
};
pub use viewport::Viewport;
pub use zoom_state::ZoomState;
