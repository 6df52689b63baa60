//! Renderer configuration and quality levels.
//!
//! High precision defaults are stored as strings so they survive without
//! passing through f64.

use crate::{BigDecimal, BigVec2, Viewport};
use serde::{Deserialize, Serialize};

/// Configuration for the deep zoom renderer.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FractalConfig {
    /// Unique identifier
    pub id: &'static str,
    /// Human-readable name for UI display
    pub display_name: &'static str,
    /// Default center coordinates as strings (preserves precision)
    pub default_center: (&'static str, &'static str),
    /// Default width in fractal space as string
    pub default_width: &'static str,
    pub default_iteration_limit: u32,
    /// Macro sectors (columns, rows) claimed by workers.
    pub sector_grid: (u32, u32),
    /// Tiles at or below this size (both axes) are iterated pixel by pixel.
    pub leaf_tile_size: u32,
    /// Workers per logical CPU.
    pub threads_per_cpu: usize,
    /// Width multiplier for click-to-zoom.
    pub zoom_in_factor: &'static str,
    /// Width multiplier for right-click zoom out.
    pub zoom_out_factor: &'static str,
}

impl FractalConfig {
    /// Create the default viewport for this fractal.
    ///
    /// Falls back to f64 parsing if the configured strings are malformed.
    pub fn default_viewport(&self) -> Viewport {
        Viewport::from_strings(
            self.default_center.0,
            self.default_center.1,
            self.default_width,
            self.default_iteration_limit,
        )
        .unwrap_or_else(|e| {
            log::warn!("Invalid default viewport in {}: {}", self.id, e);
            Viewport::new(
                BigVec2::new(
                    BigDecimal::with_precision(-0.75, 40),
                    BigDecimal::zero(40),
                ),
                BigDecimal::with_precision(3.0, 40),
                1024,
            )
        })
    }

    /// Worker count for this machine.
    pub fn worker_count(&self, logical_cpus: usize) -> usize {
        (logical_cpus * self.threads_per_cpu).max(1)
    }
}

/// Mandelbrot deep zoom configuration.
/// This is the canonical source of truth for rendering parameters.
pub static MANDELBROT_CONFIG: FractalConfig = FractalConfig {
    id: "mandelbrot",
    display_name: "Mandelbrot Set",
    default_center: ("-0.75", "0"),
    default_width: "3.0",
    default_iteration_limit: 1024,
    sector_grid: (8, 6),
    leaf_tile_size: 3,
    threads_per_cpu: 2,
    zoom_in_factor: "0.2",
    zoom_out_factor: "5",
};

/// Supersampling level: how many samples are computed per output pixel
/// and how they are resolved.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Quality {
    /// One sample per pixel.
    #[default]
    X1,
    /// Two horizontal samples per pixel.
    X2,
    /// 2×2 samples per pixel.
    X4,
    /// 2×2 samples per pixel blended over the 3×3 pixel neighbourhood.
    X4Smooth,
    /// 3×3 samples per pixel.
    X9,
}

impl Quality {
    pub const ALL: [Quality; 5] = [
        Quality::X1,
        Quality::X2,
        Quality::X4,
        Quality::X4Smooth,
        Quality::X9,
    ];

    /// Samples per output pixel along (x, y).
    pub fn factor(self) -> (u32, u32) {
        match self {
            Quality::X1 => (1, 1),
            Quality::X2 => (2, 1),
            Quality::X4 | Quality::X4Smooth => (2, 2),
            Quality::X9 => (3, 3),
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Quality::X1 => "1x",
            Quality::X2 => "2x",
            Quality::X4 => "4x",
            Quality::X4Smooth => "4x9",
            Quality::X9 => "9x",
        }
    }

    pub fn from_label(label: &str) -> Option<Quality> {
        Quality::ALL.into_iter().find(|q| q.label() == label)
    }

    /// Sample raster size for an output size.
    pub fn sample_size(self, screen: (u32, u32)) -> (u32, u32) {
        let (fx, fy) = self.factor();
        (screen.0 * fx, screen.1 * fy)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mandelbrot_config_values() {
        assert_eq!(MANDELBROT_CONFIG.sector_grid, (8, 6));
        assert_eq!(MANDELBROT_CONFIG.leaf_tile_size, 3);
        assert_eq!(MANDELBROT_CONFIG.worker_count(4), 8);
    }

    #[test]
    fn default_viewport_is_the_classic_view() {
        let viewport = MANDELBROT_CONFIG.default_viewport();
        assert_eq!(viewport.center.x.to_f64(), -0.75);
        assert_eq!(viewport.center.y.to_f64(), 0.0);
        assert_eq!(viewport.width.to_f64(), 3.0);
        assert_eq!(viewport.iteration_limit, 1024);
    }

    #[test]
    fn quality_labels_roundtrip() {
        for quality in Quality::ALL {
            assert_eq!(Quality::from_label(quality.label()), Some(quality));
        }
        assert_eq!(Quality::from_label("16x"), None);
    }

    #[test]
    fn sample_size_scales_per_axis() {
        assert_eq!(Quality::X2.sample_size((100, 50)), (200, 50));
        assert_eq!(Quality::X9.sample_size((100, 50)), (300, 150));
    }
}
