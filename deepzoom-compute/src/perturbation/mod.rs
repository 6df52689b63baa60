//! Perturbation theory computation for deep Mandelbrot zoom.
//!
//! Computes one reference orbit at high precision, then uses a cubic series
//! and fast f64 delta iterations, rebased onto the same orbit, for
//! individual pixels.

mod approximation;
mod arena;
mod reference_orbit;

pub use approximation::Approximation;
pub use arena::{ApproxArena, ApproxId};
pub use reference_orbit::{direct_iterations, direct_iterations_big, ReferenceOrbit};

use deepzoom_core::{PrecisionContext, Viewport};

/// Escape radius 2, squared.
pub const ESCAPE_NORM_SQ: f64 = 4.0;

/// Per-frame constants shared by every approximation of the frame.
#[derive(Clone, Debug)]
pub struct Frame {
    /// Viewport rounded to the frame's precision
    pub viewport: Viewport,
    pub context: PrecisionContext,
    /// Iteration cap
    pub cap: u32,
}

impl Frame {
    pub fn new(viewport: &Viewport, samples: (u32, u32)) -> Self {
        let context = PrecisionContext::for_viewport(viewport, samples);
        let digits = context.digits.max(viewport.precision_digits());
        Self {
            viewport: viewport.with_precision_digits(digits),
            context: PrecisionContext { digits, ..context },
            cap: viewport.iteration_limit,
        }
    }
}

#[cfg(test)]
mod tests;
