//! Mapping between the supersampled raster and screen offsets.

use deepzoom_core::{PixelRect, Quality, Vec2, Viewport};

/// Geometry of the sample raster for one frame.
///
/// Screen offsets are normalised by the output width (see
/// [`Viewport`](deepzoom_core::Viewport)), so they do not depend on the
/// supersampling factor.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SampleGrid {
    /// Output size in pixels
    pub screen: (u32, u32),
    /// Samples per pixel along x and y
    pub factor: (u32, u32),
}

impl SampleGrid {
    pub fn new(screen: (u32, u32), quality: Quality) -> Self {
        Self {
            screen,
            factor: quality.factor(),
        }
    }

    /// Sample raster size.
    pub fn size(&self) -> (u32, u32) {
        (self.screen.0 * self.factor.0, self.screen.1 * self.factor.1)
    }

    pub fn bounds(&self) -> PixelRect {
        let (w, h) = self.size();
        PixelRect::new(0, 0, w, h)
    }

    /// Screen offset of a continuous sample-raster position.
    pub fn offset_at(&self, sx: f64, sy: f64) -> Vec2 {
        let w = self.screen.0.max(1) as f64;
        let h = self.screen.1 as f64;
        Vec2::new(
            (sx / self.factor.0 as f64 - w / 2.0) / w,
            (h / 2.0 - sy / self.factor.1 as f64) / w,
        )
    }

    /// Screen offset of the centre of sample (sx, sy).
    pub fn sample_offset(&self, sx: u32, sy: u32) -> Vec2 {
        self.offset_at(sx as f64 + 0.5, sy as f64 + 0.5)
    }

    /// Screen offset of a rectangle's centre.
    pub fn rect_center(&self, rect: &PixelRect) -> Vec2 {
        let (cx, cy) = rect.center();
        self.offset_at(cx, cy)
    }

    /// Half-diagonal of a rectangle in screen units.
    pub fn rect_radius(&self, rect: &PixelRect) -> f64 {
        let w = self.screen.0.max(1) as f64;
        let half_x = rect.width as f64 / self.factor.0 as f64 / 2.0 / w;
        let half_y = rect.height as f64 / self.factor.1 as f64 / 2.0 / w;
        Vec2::new(half_x, half_y).norm()
    }

    /// Half extents of the whole screen in screen units.
    pub fn half_extent(&self) -> Vec2 {
        Viewport::half_extent(self.screen)
    }
}
