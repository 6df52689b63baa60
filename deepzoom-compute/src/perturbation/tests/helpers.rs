use crate::perturbation::{Approximation, Frame};
use deepzoom_core::{Vec2, Viewport};
use std::sync::Arc;

/// Centre of the double spiral in Seahorse Valley.
pub const SPIRAL_RE: &str = "-0.743643887037158704752191506114774";
pub const SPIRAL_IM: &str = "0.131825904205311970493132056385139";

/// Screen used by most tests: 4:3, so y spans ±0.375.
pub const TEST_SCREEN: (u32, u32) = (640, 480);

pub fn frame(re: &str, im: &str, width: &str, limit: u32) -> Arc<Frame> {
    let viewport = Viewport::from_strings(re, im, width, limit).unwrap();
    Arc::new(Frame::new(&viewport, TEST_SCREEN))
}

/// Radius of a whole 4:3 screen around its centre.
pub fn screen_radius() -> f64 {
    Vec2::new(0.5, 0.375).norm()
}

/// Approximation with the reference at the viewport centre.
pub fn root(frame: &Arc<Frame>) -> Approximation {
    Approximation::fill_in_cubic(frame.clone(), Vec2::ZERO, screen_radius())
}

/// Offsets of a `columns` × `rows` grid spanning the whole screen.
pub fn screen_grid(columns: u32, rows: u32) -> Vec<Vec2> {
    let mut offsets = Vec::new();
    for j in 0..rows {
        for i in 0..columns {
            offsets.push(Vec2::new(
                i as f64 / (columns - 1) as f64 - 0.5,
                0.375 - j as f64 * 0.75 / (rows - 1) as f64,
            ));
        }
    }
    offsets
}
