//! Cubic series approximation over a reference orbit.
//!
//! For a point at screen offset `u` near the approximation's centre, the
//! scaled delta from the reference after `N` iterations is predicted as
//!
//! ```text
//! D_N(v) = d + A·v + B·v² + C·v³,    v = u - center
//! ```
//!
//! Deltas are stored multiplied by 10^E (see [`PrecisionContext`]) so they
//! stay inside the f64 range at any supported depth. With `k = 10^-E` and
//! `W = width·10^E` one iteration of the series reads
//!
//! ```text
//! y  = X_n + k·d
//! d' = 2·X_n·d + k·d² + W·u0
//! A' = 2·y·A + W
//! B' = 2·y·B + k·A²
//! C' = 2·y·C + 2k·A·B
//! ```
//!
//! where `u0` is the centre's offset from the reference point.

use super::{ApproxId, Frame, ReferenceOrbit, ESCAPE_NORM_SQ};
use deepzoom_core::{PrecisionContext, Vec2};
use std::sync::Arc;

/// Largest tolerated |C|R³ relative to |A|R.
const TRUNCATION_TOLERANCE: f64 = 1e-6;

/// Largest squared delta a series prediction may reach.
const SERIES_DELTA_BOUND: f64 = 1e-4;

/// Fraction of the escape and delta bounds a series prediction may use.
const SERIES_HEADROOM: f64 = 0.25;

/// A pixel delta is unscaled once its true magnitude exceeds 10^-UNSCALE_EXPONENT.
const UNSCALE_EXPONENT: i32 = 280;

/// Nucleus relocation is only tried for orbits surviving past this iteration.
const NEWTON_MIN_DEPTH: u32 = 30;

/// Orbits already this close to zero at N are left alone.
const NEWTON_MIN_NORM_SQ: f64 = 1e-12;

const NEWTON_STEPS: usize = 16;

/// Newton steps below this fraction of the radius count as converged.
const NEWTON_TOLERANCE: f64 = 1e-10;

/// Series state at one orbit index.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
struct Series {
    n: usize,
    d: Vec2,
    a: Vec2,
    b: Vec2,
    c: Vec2,
}

impl Series {
    /// Re-expand around a point `u0` away from the current expansion point.
    fn shift(self, u0: Vec2) -> Self {
        let u0_sq = u0.square();
        Self {
            n: self.n,
            d: self.eval(u0),
            a: self.a + self.b.dot_flop(u0) * 2.0 + self.c.dot_flop(u0_sq) * 3.0,
            b: self.b + self.c.dot_flop(u0) * 3.0,
            c: self.c,
        }
    }

    #[inline]
    fn eval(&self, v: Vec2) -> Vec2 {
        // Horner: d + v(A + v(B + vC))
        self.d + v.dot_flop(self.a + v.dot_flop(self.b + v.dot_flop(self.c)))
    }

    #[inline]
    fn derivative(&self, v: Vec2) -> Vec2 {
        self.a + v.dot_flop(self.b * 2.0 + v.dot_flop(self.c * 3.0))
    }

    /// Step forward along the orbit while the series stays trustworthy
    /// for every point within `radius` of the expansion point.
    ///
    /// `offset` is the expansion point's screen offset from the reference.
    fn advance(
        mut self,
        orbit: &ReferenceOrbit,
        context: &PrecisionContext,
        offset: Vec2,
        radius: f64,
    ) -> Self {
        let k = context.scale;
        let width = context.width_scaled;
        let r2 = radius * radius;
        let r3 = r2 * radius;
        let dc = offset * width;

        while self.n + 1 < orbit.orbit.len() {
            let x = orbit.orbit[self.n];
            let y = x + self.d * k;

            let d = x.dot_flop(self.d) * 2.0 + self.d.square() * k + dc;
            let a = y.dot_flop(self.a) * 2.0 + Vec2::new(width, 0.0);
            let b = y.dot_flop(self.b) * 2.0 + self.a.square() * k;
            let c = y.dot_flop(self.c) * 2.0 + self.a.dot_flop(self.b) * (2.0 * k);

            if !(d.is_finite() && a.is_finite() && b.is_finite() && c.is_finite()) {
                break;
            }

            let (a_norm, b_norm, c_norm) = (a.norm(), b.norm(), c.norm());
            if c_norm * r3 > TRUNCATION_TOLERANCE * a_norm * radius {
                break;
            }

            let predicted = k * (d.norm() + a_norm * radius + b_norm * r2 + c_norm * r3);
            let bound = SERIES_HEADROOM * SERIES_DELTA_BOUND.min(orbit.distance[self.n + 1]);
            let within_bound = predicted * predicted < bound;
            if !within_bound {
                break;
            }

            self = Self {
                n: self.n + 1,
                d,
                a,
                b,
                c,
            };
        }
        self
    }
}

/// A reference orbit plus a cubic series valid over one screen tile.
#[derive(Clone, Debug)]
pub struct Approximation {
    pub frame: Arc<Frame>,
    pub reference: Arc<ReferenceOrbit>,
    /// Screen offset of the tile centre
    pub center: Vec2,
    /// Screen offset of the reference point
    pub reference_offset: Vec2,
    /// Scaled delta of the tile centre from the reference at `series_iterations`
    pub center_delta: Vec2,
    /// Linear, quadratic and cubic coefficients (scaled)
    pub coefficients: [Vec2; 3],
    /// Screen-unit radius the series was validated for
    pub radius: f64,
    /// Iterations the series skips (N)
    pub series_iterations: u32,
    pub parent: Option<ApproxId>,
    /// The approximation this one was relocated from
    pub original: Option<ApproxId>,
}

impl Approximation {
    /// Build a reference orbit at screen offset `offset` and the series
    /// around it, valid within `radius`.
    pub fn fill_in_cubic(frame: Arc<Frame>, offset: Vec2, radius: f64) -> Self {
        Self::build(frame, offset, offset, radius)
    }

    /// Rebuild this tile's approximation with the reference moved to
    /// `reference_offset`. Centre and radius stay.
    pub fn re_fill_in_cubic(&self, reference_offset: Vec2) -> Self {
        let mut rebuilt = Self::build(
            self.frame.clone(),
            self.center,
            reference_offset,
            self.radius,
        );
        rebuilt.parent = self.parent;
        rebuilt
    }

    fn build(frame: Arc<Frame>, center: Vec2, reference_offset: Vec2, radius: f64) -> Self {
        let c = frame.viewport.to_world(reference_offset);
        let reference = Arc::new(ReferenceOrbit::compute(
            &c,
            frame.cap,
            frame.context.digits,
        ));

        let u0 = center - reference_offset;
        let around_reference = Series::default().advance(
            &reference,
            &frame.context,
            Vec2::ZERO,
            radius + u0.norm(),
        );
        let series = if u0 == Vec2::ZERO {
            around_reference
        } else {
            around_reference
                .shift(u0)
                .advance(&reference, &frame.context, u0, radius)
        };

        log::trace!(
            "Reference at ({:.6}, {:.6}), c = ({:e}, {:e}): depth {}, series skips {}",
            reference_offset.x,
            reference_offset.y,
            reference.c_f64.x,
            reference.c_f64.y,
            reference.depth(),
            series.n
        );

        Self::from_series(frame, reference, center, reference_offset, radius, series)
    }

    fn from_series(
        frame: Arc<Frame>,
        reference: Arc<ReferenceOrbit>,
        center: Vec2,
        reference_offset: Vec2,
        radius: f64,
        series: Series,
    ) -> Self {
        Self {
            frame,
            reference,
            center,
            reference_offset,
            center_delta: series.d,
            coefficients: [series.a, series.b, series.c],
            radius,
            series_iterations: series.n as u32,
            parent: None,
            original: None,
        }
    }

    fn series(&self) -> Series {
        Series {
            n: self.series_iterations as usize,
            d: self.center_delta,
            a: self.coefficients[0],
            b: self.coefficients[1],
            c: self.coefficients[2],
        }
    }

    /// Derive the approximation of a sub-tile centred at `center`.
    ///
    /// Re-expands this series around the new centre and keeps iterating it
    /// as far as the smaller radius allows. The reference orbit is shared.
    pub fn derive_child(&self, center: Vec2, radius: f64) -> Self {
        let series = self.series().shift(center - self.center).advance(
            &self.reference,
            &self.frame.context,
            center - self.reference_offset,
            radius,
        );
        Self::from_series(
            self.frame.clone(),
            self.reference.clone(),
            center,
            self.reference_offset,
            radius,
            series,
        )
    }

    /// Escape count of the reference (the cap when it never escaped).
    pub fn depth(&self) -> u32 {
        self.reference.depth()
    }

    /// Escape count of the point at offset `v` from the tile centre, or 0
    /// when it does not escape below the cap.
    ///
    /// The delta always stays relative to the reference orbit. When the
    /// full value `x_m + dx` becomes smaller than the delta, or the orbit
    /// runs out, the delta is rebased onto the start of the orbit, so the
    /// pixel's `c` is never rebuilt in plain f64.
    pub fn calculate_iterations(&self, v: Vec2) -> u32 {
        let reference = &*self.reference;
        let context = &self.frame.context;
        let cap = reference.cap;
        let last = reference.last_index();
        let k = context.scale;

        let mut n = self.series_iterations;
        let mut m = n as usize;
        let mut dx = self.series().eval(v);
        let mut dc = (self.center - self.reference_offset + v) * context.width_scaled;

        let mut scaled = context.is_scaled();
        let unscale_norm_sq = if scaled {
            let limit = 10f64.powi(context.extra_exponent - UNSCALE_EXPONENT);
            limit * limit
        } else {
            f64::INFINITY
        };
        if scaled && dx.norm_sq() > unscale_norm_sq {
            dx = dx * k;
            dc = dc * k;
            scaled = false;
        }

        loop {
            if n >= cap {
                return 0;
            }
            let mut x = reference.orbit[m];

            if scaled {
                // |dx| is below 1e-280, so only the reference decides escape
                if x.norm_sq() >= ESCAPE_NORM_SQ {
                    return n;
                }
            } else {
                let z = x + dx;
                let z_norm_sq = z.norm_sq();
                if z_norm_sq >= ESCAPE_NORM_SQ {
                    return n;
                }
                if m >= last || z_norm_sq < dx.norm_sq() {
                    dx = z;
                    m = 0;
                    x = Vec2::ZERO;
                }
            }

            let quadratic = if scaled { dx.square() * k } else { dx.square() };
            dx = x.dot_flop(dx) * 2.0 + quadratic + dc;
            m += 1;
            n += 1;

            if scaled && dx.norm_sq() > unscale_norm_sq {
                dx = dx * k;
                dc = dc * k;
                scaled = false;
            }
        }
    }

    /// Move the reference onto the nearby zero of the series.
    ///
    /// Solves `X_N/k + D_N(v) = 0` by Newton iteration. Returns `None` when
    /// the reference escaped early, already sits near zero at N, or no
    /// root lies inside the radius.
    pub fn relocate_to_nucleus(&self) -> Option<Self> {
        if self
            .reference
            .escaped_at
            .is_some_and(|escaped| escaped <= NEWTON_MIN_DEPTH)
        {
            return None;
        }
        let x_n = self.reference.orbit[self.series_iterations as usize];
        if x_n.norm_sq() <= NEWTON_MIN_NORM_SQ {
            return None;
        }

        let series = self.series();
        let target = x_n / self.frame.context.scale;
        let mut v = self.reference_offset - self.center;
        let mut converged = false;
        for _ in 0..NEWTON_STEPS {
            let step = (target + series.eval(v)).complex_div(series.derivative(v));
            if !step.is_finite() {
                return None;
            }
            v = v - step;
            if step.norm() <= NEWTON_TOLERANCE * self.radius {
                converged = true;
                break;
            }
        }

        if !converged || v.norm() > self.radius {
            return None;
        }
        log::debug!(
            "Relocating reference to nucleus at ({:.6}, {:.6})",
            self.center.x + v.x,
            self.center.y + v.y
        );
        Some(self.re_fill_in_cubic(self.center + v))
    }
}
