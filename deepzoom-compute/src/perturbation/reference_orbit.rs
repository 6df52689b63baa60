//! Reference orbit computation for perturbation rendering.
//!
//! Computes the orbit of one point at full precision, storing the results
//! as f64 for fast delta iterations.

use deepzoom_core::{BigDecimal, BigVec2, Vec2};

/// A pre-computed reference orbit for perturbation rendering.
#[derive(Clone, Debug)]
pub struct ReferenceOrbit {
    /// Reference point C at full precision
    pub c: BigVec2,
    /// Reference point C rounded to f64, for logging
    pub c_f64: Vec2,
    /// Orbit values X_n as f64, starting with X_0 = 0
    pub orbit: Vec<Vec2>,
    /// Signed squared distance to the escape circle, (2-|X_n|)·|2-|X_n||
    pub distance: Vec<f64>,
    /// Iteration at which the reference escaped (None if it reached the cap)
    pub escaped_at: Option<u32>,
    /// Iteration cap the orbit was computed for
    pub cap: u32,
}

impl ReferenceOrbit {
    /// Compute a reference orbit with `digits` significant digits.
    ///
    /// Iterates until |z|² ≥ 4 or `cap` iterations, whichever is first.
    pub fn compute(c: &BigVec2, cap: u32, digits: usize) -> Self {
        let c = c.with_precision_digits(digits);
        let mut orbit = Vec::with_capacity(cap.min(1 << 16) as usize);
        let mut distance = Vec::with_capacity(cap.min(1 << 16) as usize);

        let mut z = BigVec2::zero(digits);
        orbit.push(Vec2::ZERO);
        distance.push(escape_distance(Vec2::ZERO));

        let mut escaped_at = None;
        for n in 1..cap {
            z = z.square().add(&c);
            let x = z.to_vec2();
            orbit.push(x);
            distance.push(escape_distance(x));
            if x.norm_sq() >= 4.0 {
                escaped_at = Some(n);
                break;
            }
        }

        Self {
            c_f64: c.to_vec2(),
            c,
            orbit,
            distance,
            escaped_at,
            cap,
        }
    }

    /// Escape count of the reference, with "never escaped" counted as the cap.
    pub fn depth(&self) -> u32 {
        self.escaped_at.unwrap_or(self.cap)
    }

    pub fn reached_cap(&self) -> bool {
        self.escaped_at.is_none()
    }

    /// Index of the last stored orbit value.
    pub fn last_index(&self) -> usize {
        self.orbit.len().saturating_sub(1)
    }
}

#[inline]
fn escape_distance(x: Vec2) -> f64 {
    let gap = 2.0 - x.norm();
    gap * gap.abs()
}

/// Direct f64 escape count: 0 when `c` does not escape below `limit`.
pub fn direct_iterations(c: Vec2, limit: u32) -> u32 {
    let mut z = Vec2::ZERO;
    for n in 1..limit {
        z = z.square() + c;
        if z.norm_sq() >= 4.0 {
            return n;
        }
    }
    0
}

/// Full precision escape count, for checking perturbation results.
pub fn direct_iterations_big(c: &BigVec2, limit: u32) -> u32 {
    let four = BigDecimal::with_precision(4.0, c.x.precision_digits());
    let mut z = BigVec2::zero(c.x.precision_digits());
    for n in 1..limit {
        z = z.square().add(c);
        if z.norm_sq() >= four {
            return n;
        }
    }
    0
}
