//! Viewport navigation.
//!
//! [`Navigator`] owns the mutable view state between frames. Renders only
//! ever see snapshots of it.

use crate::viewport::digits_for_width;
use crate::{
    palette_preset, viewport_preset, BigDecimal, BigVec2, ChannelMasks, FractalConfig, ParseError,
    Quality, Viewport, MANDELBROT_CONFIG,
};

/// Selections narrower than this many pixels on both axes are ignored.
const MIN_SELECTION_PIXELS: f64 = 2.0;

#[derive(Clone, Debug)]
pub struct Navigator {
    config: &'static FractalConfig,
    viewport: Viewport,
    screen: (u32, u32),
    quality: Quality,
    palette_name: String,
    masks: ChannelMasks,
    show_metrics: bool,
}

impl Navigator {
    pub fn new(screen: (u32, u32)) -> Self {
        Self::with_config(&MANDELBROT_CONFIG, screen)
    }

    pub fn with_config(config: &'static FractalConfig, screen: (u32, u32)) -> Self {
        Self {
            config,
            viewport: config.default_viewport(),
            screen,
            quality: Quality::default(),
            palette_name: "Natural".to_string(),
            masks: ChannelMasks::IDENTITY,
            show_metrics: false,
        }
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
    }

    pub fn screen(&self) -> (u32, u32) {
        self.screen
    }

    pub fn resize(&mut self, screen: (u32, u32)) {
        self.screen = screen;
    }

    pub fn quality(&self) -> Quality {
        self.quality
    }

    pub fn set_quality(&mut self, quality: Quality) {
        self.quality = quality;
    }

    pub fn masks(&self) -> ChannelMasks {
        self.masks
    }

    pub fn palette_name(&self) -> &str {
        &self.palette_name
    }

    /// Switch to a named palette. The current one stays on error.
    pub fn select_palette(&mut self, name: &str) -> Result<(), ParseError> {
        self.masks = palette_preset(name)?;
        self.palette_name = name.to_string();
        Ok(())
    }

    pub fn show_metrics(&self) -> bool {
        self.show_metrics
    }

    pub fn toggle_metrics(&mut self) -> bool {
        self.show_metrics = !self.show_metrics;
        self.show_metrics
    }

    pub fn set_iteration_limit(&mut self, iteration_limit: u32) {
        self.viewport.iteration_limit = iteration_limit;
    }

    /// Re-centre on a pixel and shrink the width by the zoom-in factor.
    pub fn zoom_in_at(&mut self, px: f64, py: f64) {
        let factor = self.factor(self.config.zoom_in_factor, 0.2);
        self.zoom_at(px, py, &factor);
    }

    /// Re-centre on a pixel and grow the width by the zoom-out factor.
    pub fn zoom_out_at(&mut self, px: f64, py: f64) {
        let factor = self.factor(self.config.zoom_out_factor, 5.0);
        self.zoom_at(px, py, &factor);
    }

    /// Scale the width around the current centre.
    pub fn zoom_by(&mut self, factor: &BigDecimal) {
        let width = self.viewport.width.mul(factor);
        let center = self.viewport.center.clone();
        self.apply(center, width);
    }

    /// Zoom so that the dragged rectangle fills the screen.
    ///
    /// Returns false (view unchanged) for a degenerate selection.
    pub fn zoom_to_selection(&mut self, from: (f64, f64), to: (f64, f64)) -> bool {
        let dx = (to.0 - from.0).abs();
        let dy = (to.1 - from.1).abs();
        if dx < MIN_SELECTION_PIXELS && dy < MIN_SELECTION_PIXELS {
            return false;
        }

        let (w, h) = (self.screen.0.max(1) as f64, self.screen.1.max(1) as f64);
        let fraction = (dx / w).max(dy / h);
        let mid = ((from.0 + to.0) / 2.0, (from.1 + to.1) / 2.0);

        let digits = self.viewport.precision_digits();
        let center = self
            .viewport
            .to_world(Viewport::pixel_to_offset(mid.0, mid.1, self.screen));
        let width = self
            .viewport
            .width
            .mul(&BigDecimal::with_precision(fraction, digits));
        self.apply(center, width);
        true
    }

    /// Back to the configured default view.
    pub fn reset(&mut self) {
        self.viewport = self.config.default_viewport();
    }

    /// Replace the view with a named preset. Nothing changes on error.
    pub fn apply_preset(&mut self, name: &str) -> Result<(), ParseError> {
        self.viewport = viewport_preset(name)?;
        Ok(())
    }

    fn factor(&self, value: &str, fallback: f64) -> BigDecimal {
        let digits = self.viewport.precision_digits();
        BigDecimal::from_string(value, digits).unwrap_or_else(|e| {
            log::warn!("Invalid zoom factor in {}: {}", self.config.id, e);
            BigDecimal::with_precision(fallback, digits)
        })
    }

    fn zoom_at(&mut self, px: f64, py: f64, factor: &BigDecimal) {
        let center = self
            .viewport
            .to_world(Viewport::pixel_to_offset(px, py, self.screen));
        let width = self.viewport.width.mul(factor);
        self.apply(center, width);
    }

    /// Install a new centre and width, rounded to the precision the new
    /// width needs.
    fn apply(&mut self, center: BigVec2, width: BigDecimal) {
        let digits = digits_for_width(&width);
        log::debug!(
            "Viewport width {} at {} digits",
            width.log10_approx(),
            digits
        );
        self.viewport = Viewport::new(
            center.with_precision_digits(digits),
            width.with_precision_digits(digits),
            self.viewport.iteration_limit,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zoom_in_reduces_width_to_exactly_twenty_percent() {
        let mut nav = Navigator::new((800, 600));
        let before = nav.viewport().width.clone();
        nav.zoom_in_at(400.0, 300.0);
        let expected = before.mul(&BigDecimal::from_string("0.2", 40).unwrap());
        assert_eq!(nav.viewport().width, expected);
        assert_eq!(
            nav.viewport().width,
            BigDecimal::from_string("0.6", 40).unwrap()
        );
    }

    #[test]
    fn zoom_in_at_center_keeps_center() {
        let mut nav = Navigator::new((800, 600));
        let center = nav.viewport().center.clone();
        nav.zoom_in_at(400.0, 300.0);
        assert_eq!(nav.viewport().center, center);
    }

    #[test]
    fn zoom_in_recenters_on_clicked_pixel() {
        let mut nav = Navigator::new((800, 600));
        nav.zoom_in_at(600.0, 300.0);
        // quarter of the 3.0 width to the right of -0.75
        assert!((nav.viewport().center.x.to_f64() - 0.0).abs() < 1e-15);
        assert_eq!(nav.viewport().center.y.to_f64(), 0.0);
    }

    #[test]
    fn zoom_out_undoes_zoom_in_width() {
        let mut nav = Navigator::new((800, 600));
        let before = nav.viewport().width.clone();
        nav.zoom_in_at(400.0, 300.0);
        nav.zoom_out_at(400.0, 300.0);
        assert_eq!(nav.viewport().width, before);
    }

    #[test]
    fn repeated_zoom_grows_precision() {
        let mut nav = Navigator::new((800, 600));
        let start = nav.viewport().precision_digits();
        for _ in 0..100 {
            nav.zoom_in_at(401.0, 299.0);
        }
        assert!(nav.viewport().precision_digits() > start + 50);
        assert!(nav.viewport().width.log10_approx() < -68.0);
    }

    #[test]
    fn selection_zoom_uses_larger_fraction() {
        let mut nav = Navigator::new((800, 600));
        assert!(nav.zoom_to_selection((300.0, 250.0), (500.0, 350.0)));
        // 200/800 beats 100/600
        assert!((nav.viewport().width.to_f64() - 0.75).abs() < 1e-12);
        assert!((nav.viewport().center.x.to_f64() + 0.75).abs() < 1e-12);
    }

    #[test]
    fn degenerate_selection_is_ignored() {
        let mut nav = Navigator::new((800, 600));
        let before = nav.viewport().clone();
        assert!(!nav.zoom_to_selection((10.0, 10.0), (11.0, 10.5)));
        assert_eq!(nav.viewport(), &before);
    }

    #[test]
    fn reset_restores_default() {
        let mut nav = Navigator::new((800, 600));
        nav.zoom_in_at(10.0, 10.0);
        nav.reset();
        assert_eq!(nav.viewport(), &Viewport::default());
    }

    #[test]
    fn bad_preset_leaves_view_untouched() {
        let mut nav = Navigator::new((800, 600));
        nav.zoom_in_at(10.0, 10.0);
        let before = nav.viewport().clone();
        assert!(nav.apply_preset("Atlantis").is_err());
        assert_eq!(nav.viewport(), &before);
    }

    #[test]
    fn palette_and_quality_selection() {
        let mut nav = Navigator::new((800, 600));
        nav.select_palette("Swapped").unwrap();
        assert_eq!(nav.palette_name(), "Swapped");
        assert!(nav.select_palette("Plaid").is_err());
        assert_eq!(nav.palette_name(), "Swapped");

        nav.set_quality(Quality::X4Smooth);
        assert_eq!(nav.quality(), Quality::X4Smooth);
        assert!(nav.toggle_metrics());
        assert!(!nav.toggle_metrics());
    }
}
