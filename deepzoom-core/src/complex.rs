//! Two-component vectors used as complex numbers.
//!
//! [`Vec2`] is the f64 workhorse for every perturbative quantity: screen
//! offsets, orbit samples, deltas and series coefficients.
//! [`BigVec2`] carries the arbitrary-precision reference coordinate.

use crate::BigDecimal;
use serde::{Deserialize, Serialize};
use std::ops::{Add, AddAssign, Div, Mul, Neg, Sub};

/// A pair of f64 values with both component-wise and complex algebra.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec2 {
    pub x: f64,
    pub y: f64,
}

impl Vec2 {
    pub const ZERO: Vec2 = Vec2 { x: 0.0, y: 0.0 };

    #[inline]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Complex multiplication.
    #[inline]
    pub fn dot_flop(self, other: Self) -> Self {
        Self {
            x: self.x * other.x - self.y * other.y,
            y: self.x * other.y + self.y * other.x,
        }
    }

    /// Complex multiplication by the conjugate of `other`.
    #[inline]
    pub fn dot_flop_conj(self, other: Self) -> Self {
        Self {
            x: self.x * other.x + self.y * other.y,
            y: self.y * other.x - self.x * other.y,
        }
    }

    /// Complex square (optimized).
    #[inline]
    pub fn square(self) -> Self {
        Self {
            x: self.x * self.x - self.y * self.y,
            y: 2.0 * self.x * self.y,
        }
    }

    /// Complex division. Division by zero yields non-finite components,
    /// which callers test with [`Vec2::is_finite`].
    #[inline]
    pub fn complex_div(self, other: Self) -> Self {
        let denom = other.norm_sq();
        let num = self.dot_flop_conj(other);
        Self {
            x: num.x / denom,
            y: num.y / denom,
        }
    }

    /// Magnitude squared.
    #[inline]
    pub fn norm_sq(self) -> f64 {
        self.x * self.x + self.y * self.y
    }

    #[inline]
    pub fn norm(self) -> f64 {
        self.norm_sq().sqrt()
    }

    /// Component-wise integer power.
    pub fn powi(self, n: i32) -> Self {
        Self::new(self.x.powi(n), self.y.powi(n))
    }

    /// Component-wise square root.
    pub fn sqrt(self) -> Self {
        Self::new(self.x.sqrt(), self.y.sqrt())
    }

    /// Multiply both components by 10^-places.
    pub fn move_point_left(self, places: i32) -> Self {
        self * 10f64.powi(-places)
    }

    #[inline]
    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl Add for Vec2 {
    type Output = Vec2;

    #[inline]
    fn add(self, other: Vec2) -> Vec2 {
        Vec2::new(self.x + other.x, self.y + other.y)
    }
}

impl AddAssign for Vec2 {
    #[inline]
    fn add_assign(&mut self, other: Vec2) {
        self.x += other.x;
        self.y += other.y;
    }
}

impl Sub for Vec2 {
    type Output = Vec2;

    #[inline]
    fn sub(self, other: Vec2) -> Vec2 {
        Vec2::new(self.x - other.x, self.y - other.y)
    }
}

impl Neg for Vec2 {
    type Output = Vec2;

    #[inline]
    fn neg(self) -> Vec2 {
        Vec2::new(-self.x, -self.y)
    }
}

impl Mul<f64> for Vec2 {
    type Output = Vec2;

    #[inline]
    fn mul(self, factor: f64) -> Vec2 {
        Vec2::new(self.x * factor, self.y * factor)
    }
}

impl Div<f64> for Vec2 {
    type Output = Vec2;

    #[inline]
    fn div(self, divisor: f64) -> Vec2 {
        Vec2::new(self.x / divisor, self.y / divisor)
    }
}

/// Arbitrary precision complex coordinate.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BigVec2 {
    pub x: BigDecimal,
    pub y: BigDecimal,
}

impl BigVec2 {
    pub fn new(x: BigDecimal, y: BigDecimal) -> Self {
        Self { x, y }
    }

    pub fn zero(precision_digits: usize) -> Self {
        Self {
            x: BigDecimal::zero(precision_digits),
            y: BigDecimal::zero(precision_digits),
        }
    }

    pub fn from_vec2(v: Vec2, precision_digits: usize) -> Self {
        Self {
            x: BigDecimal::with_precision(v.x, precision_digits),
            y: BigDecimal::with_precision(v.y, precision_digits),
        }
    }

    pub fn with_precision_digits(&self, precision_digits: usize) -> Self {
        Self {
            x: self.x.with_precision_digits(precision_digits),
            y: self.y.with_precision_digits(precision_digits),
        }
    }

    pub fn add(&self, other: &Self) -> Self {
        Self {
            x: self.x.add(&other.x),
            y: self.y.add(&other.y),
        }
    }

    pub fn sub(&self, other: &Self) -> Self {
        Self {
            x: self.x.sub(&other.x),
            y: self.y.sub(&other.y),
        }
    }

    /// Complex multiplication.
    pub fn mul(&self, other: &Self) -> Self {
        Self {
            x: self.x.mul(&other.x).sub(&self.y.mul(&other.y)),
            y: self.x.mul(&other.y).add(&self.y.mul(&other.x)),
        }
    }

    /// Complex division.
    pub fn div(&self, other: &Self) -> Self {
        let denom = other.norm_sq();
        let re = self.x.mul(&other.x).add(&self.y.mul(&other.y));
        let im = self.y.mul(&other.x).sub(&self.x.mul(&other.y));
        Self {
            x: re.div(&denom),
            y: im.div(&denom),
        }
    }

    /// Multiply both components by a real scalar.
    pub fn scale(&self, factor: &BigDecimal) -> Self {
        Self {
            x: self.x.mul(factor),
            y: self.y.mul(factor),
        }
    }

    /// Complex square (one multiplication fewer than `mul`).
    pub fn square(&self) -> Self {
        let xy = self.x.mul(&self.y);
        Self {
            x: self.x.mul(&self.x).sub(&self.y.mul(&self.y)),
            y: xy.add(&xy),
        }
    }

    /// Complex integer power, n >= 0.
    pub fn powi(&self, n: u32) -> Self {
        let precision = self.x.precision_digits().max(self.y.precision_digits());
        let mut result = Self {
            x: BigDecimal::one(precision),
            y: BigDecimal::zero(precision),
        };
        let mut base = self.clone();
        let mut n = n;
        while n > 0 {
            if n & 1 == 1 {
                result = result.mul(&base);
            }
            base = base.square();
            n >>= 1;
        }
        result
    }

    pub fn norm_sq(&self) -> BigDecimal {
        self.x.mul(&self.x).add(&self.y.mul(&self.y))
    }

    /// Magnitude.
    pub fn sqrt_norm(&self) -> BigDecimal {
        self.norm_sq().sqrt()
    }

    pub fn move_point_left(&self, places: i32) -> Self {
        Self {
            x: self.x.move_point_left(places),
            y: self.y.move_point_left(places),
        }
    }

    pub fn to_vec2(&self) -> Vec2 {
        Vec2::new(self.x.to_f64(), self.y.to_f64())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dot_flop_is_complex_multiplication() {
        // (1 + 2i) * (3 + 4i) = -5 + 10i
        let a = Vec2::new(1.0, 2.0);
        let b = Vec2::new(3.0, 4.0);
        assert_eq!(a.dot_flop(b), Vec2::new(-5.0, 10.0));
    }

    #[test]
    fn dot_flop_conj_multiplies_by_conjugate() {
        // (1 + 2i) * (3 - 4i) = 11 + 2i
        let a = Vec2::new(1.0, 2.0);
        let b = Vec2::new(3.0, 4.0);
        assert_eq!(a.dot_flop_conj(b), Vec2::new(11.0, 2.0));
    }

    #[test]
    fn square_matches_dot_flop() {
        let a = Vec2::new(3.0, 4.0);
        assert_eq!(a.square(), a.dot_flop(a));
        assert_eq!(a.square(), Vec2::new(-7.0, 24.0));
    }

    #[test]
    fn complex_div_inverts_dot_flop() {
        let a = Vec2::new(1.5, -0.25);
        let b = Vec2::new(-2.0, 0.75);
        let back = a.dot_flop(b).complex_div(b);
        assert!((back - a).norm() < 1e-15);
    }

    #[test]
    fn division_by_zero_is_not_finite() {
        let a = Vec2::new(1.0, 1.0);
        assert!(!a.complex_div(Vec2::ZERO).is_finite());
    }

    #[test]
    fn big_square_matches_mul() {
        let a = BigVec2::new(
            BigDecimal::from_string("0.3", 40).unwrap(),
            BigDecimal::from_string("-1.25", 40).unwrap(),
        );
        assert_eq!(a.square(), a.mul(&a));
        assert_eq!(a.powi(2), a.square());
    }

    #[test]
    fn big_div_matches_f64() {
        let a = BigVec2::from_vec2(Vec2::new(1.0, 2.0), 40);
        let b = BigVec2::from_vec2(Vec2::new(3.0, 4.0), 40);
        let q = a.div(&b).to_vec2();
        let expected = Vec2::new(1.0, 2.0).complex_div(Vec2::new(3.0, 4.0));
        assert!((q - expected).norm() < 1e-15);
    }

    #[test]
    fn big_norm_of_three_four_is_five() {
        let a = BigVec2::from_vec2(Vec2::new(3.0, 4.0), 30);
        assert_eq!(a.sqrt_norm(), BigDecimal::from_string("5", 30).unwrap());
    }
}
