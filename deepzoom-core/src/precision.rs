//! Precision context for deep zoom rendering.
//!
//! Determines how many decimal digits the reference orbit needs at a given
//! viewport and resolution, and how far perturbation deltas must be
//! shifted (the extra exponent) to stay inside the f64 range.

use crate::{BigDecimal, Viewport};
use serde::{Deserialize, Serialize};

/// Safety margin for rounding errors in arithmetic operations.
const SAFETY_DIGITS: u64 = 12;

/// Smallest precision ever used.
const MIN_DIGITS: usize = 24;

/// Widths at or above 10^-SCALE_FLOOR_EXPONENT need no delta scaling.
const SCALE_FLOOR_EXPONENT: i32 = 150;

/// Calculate required precision digits for fractal computation.
///
/// Enough digits to:
/// 1. Represent the centre at the viewport's zoom level
/// 2. Distinguish adjacent samples
/// 3. Survive error amplification over `max_iterations`
///
/// Rounded up to a multiple of 8.
pub fn calculate_precision_digits(
    viewport: &Viewport,
    samples: (u32, u32),
    max_iterations: u32,
) -> usize {
    let log10_width = viewport.width.log10_approx();
    let log10_delta = log10_width - (samples.0.max(samples.1).max(1) as f64).log10();

    // M = max(|cx|, |cy|, width), at least 1 so shallow views still get digits
    let log10_cx = viewport.center.x.abs().log10_approx();
    let log10_cy = viewport.center.y.abs().log10_approx();
    let log10_m = log10_cx.max(log10_cy).max(log10_width).max(0.0);

    let ratio_digits = (log10_m - log10_delta).ceil().max(0.0) as u64;
    let iter_digits = if max_iterations > 1 {
        (max_iterations as f64).log10().ceil() as u64
    } else {
        0
    };

    let total = (ratio_digits + iter_digits + SAFETY_DIGITS) as usize;
    total.div_ceil(8).saturating_mul(8).max(MIN_DIGITS)
}

/// Power of ten by which deltas are scaled for a viewport of this width.
pub fn calculate_extra_exponent(width: &BigDecimal) -> i32 {
    let log10_width = width.log10_approx();
    if !log10_width.is_finite() || log10_width >= -(SCALE_FLOOR_EXPONENT as f64) {
        0
    } else {
        (-log10_width).ceil() as i32 - SCALE_FLOOR_EXPONENT
    }
}

/// Everything a frame needs to know about numeric precision.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PrecisionContext {
    /// Significant decimal digits for arbitrary precision values.
    pub digits: usize,
    /// Deltas are stored multiplied by 10^extra_exponent.
    pub extra_exponent: i32,
    /// 10^-extra_exponent: multiplies every quadratic delta term.
    pub scale: f64,
    /// Viewport width multiplied by 10^extra_exponent.
    pub width_scaled: f64,
}

impl PrecisionContext {
    pub fn for_viewport(viewport: &Viewport, samples: (u32, u32)) -> Self {
        let digits = calculate_precision_digits(viewport, samples, viewport.iteration_limit);
        let extra_exponent = calculate_extra_exponent(&viewport.width);
        let width_scaled = viewport.width.move_point_right(extra_exponent).to_f64();
        Self {
            digits,
            extra_exponent,
            scale: 10f64.powi(-extra_exponent),
            width_scaled,
        }
    }

    /// Whether deltas carry an extra exponent at all.
    pub fn is_scaled(&self) -> bool {
        self.extra_exponent != 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn precision_at_default_view_is_small() {
        let viewport = Viewport::default();
        let digits = calculate_precision_digits(&viewport, (1920, 1080), 1024);
        assert!(digits >= MIN_DIGITS);
        assert!(digits <= 40);
    }

    #[test]
    fn precision_increases_with_zoom() {
        let shallow = Viewport::default();
        let deep = Viewport::from_strings("-0.75", "0.1", "1e-100", 1024).unwrap();
        let shallow_digits = calculate_precision_digits(&shallow, (800, 600), 1024);
        let deep_digits = calculate_precision_digits(&deep, (800, 600), 1024);
        assert!(deep_digits > shallow_digits + 90);
    }

    #[test]
    fn precision_is_multiple_of_eight() {
        let viewport = Viewport::from_strings("0.25", "0", "1e-37", 5000).unwrap();
        assert_eq!(calculate_precision_digits(&viewport, (640, 480), 5000) % 8, 0);
    }

    #[test]
    fn extra_exponent_is_zero_for_normal_widths() {
        let width = BigDecimal::from_string("1e-100", 200).unwrap();
        assert_eq!(calculate_extra_exponent(&width), 0);
    }

    #[test]
    fn extra_exponent_brings_width_into_range() {
        let viewport = Viewport::from_strings("-1", "0", "2.5e-280", 1000).unwrap();
        let context = PrecisionContext::for_viewport(&viewport, (64, 48));
        assert_eq!(context.extra_exponent, 130);
        assert!((context.width_scaled / 2.5e-150 - 1.0).abs() < 1e-12);
        assert!(context.is_scaled());
    }
}
