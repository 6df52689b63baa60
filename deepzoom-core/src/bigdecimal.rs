use crate::ParseError;
use dashu::integer::IBig;
use dashu_base::Abs;
use dashu_float::ops::SquareRoot;
use dashu_float::DBig;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Arbitrary precision decimal with explicit precision enforcement.
///
/// Precision is counted in significant decimal digits. Every operation
/// rounds its result to the larger precision of its operands, so a value
/// built from a [`PrecisionContext`](crate::PrecisionContext) keeps that
/// context through the whole reference orbit.
///
/// Decimal (not binary) digits keep zoom factors such as 0.2 exact.
#[derive(Clone, Debug)]
pub struct BigDecimal {
    value: DBig,
    precision_digits: usize,
}

impl BigDecimal {
    /// Create zero with explicit precision
    pub fn zero(precision_digits: usize) -> Self {
        Self::from_dbig(DBig::ZERO, precision_digits)
    }

    /// Create one with explicit precision
    pub fn one(precision_digits: usize) -> Self {
        Self::from_dbig(DBig::ONE, precision_digits)
    }

    fn from_dbig(value: DBig, precision_digits: usize) -> Self {
        let precision_digits = precision_digits.max(1);
        Self {
            value: value.with_precision(precision_digits).value(),
            precision_digits,
        }
    }

    /// Create from f64 with explicit precision.
    ///
    /// Goes through the shortest round-trip decimal form, so `0.2` becomes
    /// exactly 2e-1 rather than the nearest binary fraction.
    pub fn with_precision(val: f64, precision_digits: usize) -> Self {
        if !val.is_finite() || val == 0.0 {
            return Self::zero(precision_digits);
        }
        let text = format!("{:e}", val);
        match text.parse::<DBig>() {
            Ok(value) => Self::from_dbig(value, precision_digits),
            Err(_) => Self::zero(precision_digits),
        }
    }

    /// Parse a plain or scientific decimal string.
    pub fn from_string(val: &str, precision_digits: usize) -> Result<Self, ParseError> {
        let trimmed = val.trim();
        trimmed
            .parse::<DBig>()
            .map(|value| Self::from_dbig(value, precision_digits))
            .map_err(|e| ParseError::Decimal {
                value: trimmed.to_string(),
                reason: e.to_string(),
            })
    }

    /// Get precision in decimal digits
    pub fn precision_digits(&self) -> usize {
        self.precision_digits
    }

    /// Re-round to a different precision context.
    pub fn with_precision_digits(&self, precision_digits: usize) -> Self {
        Self::from_dbig(self.value.clone(), precision_digits)
    }

    /// Convert to f64. Values outside the f64 range saturate to 0 or infinity.
    pub fn to_f64(&self) -> f64 {
        self.value.to_f64().value()
    }

    pub fn is_zero(&self) -> bool {
        self.value == DBig::ZERO
    }

    pub fn add(&self, other: &Self) -> Self {
        self.combine(other, &self.value + &other.value)
    }

    pub fn sub(&self, other: &Self) -> Self {
        self.combine(other, &self.value - &other.value)
    }

    pub fn mul(&self, other: &Self) -> Self {
        self.combine(other, &self.value * &other.value)
    }

    pub fn div(&self, other: &Self) -> Self {
        self.combine(other, &self.value / &other.value)
    }

    fn combine(&self, other: &Self, value: DBig) -> Self {
        Self::from_dbig(value, self.precision_digits.max(other.precision_digits))
    }

    pub fn neg(&self) -> Self {
        Self {
            value: -self.value.clone(),
            precision_digits: self.precision_digits,
        }
    }

    pub fn abs(&self) -> Self {
        Self {
            value: self.value.clone().abs(),
            precision_digits: self.precision_digits,
        }
    }

    pub fn sqrt(&self) -> Self {
        if self.value <= DBig::ZERO {
            return Self::zero(self.precision_digits);
        }
        Self::from_dbig(self.value.sqrt(), self.precision_digits)
    }

    /// Integer power by repeated squaring. Negative exponents divide.
    pub fn powi(&self, exponent: i32) -> Self {
        let mut result = Self::one(self.precision_digits);
        let mut base = self.clone();
        let mut n = exponent.unsigned_abs();
        while n > 0 {
            if n & 1 == 1 {
                result = result.mul(&base);
            }
            base = base.mul(&base);
            n >>= 1;
        }
        if exponent < 0 {
            Self::one(self.precision_digits).div(&result)
        } else {
            result
        }
    }

    /// Multiply by 10^-places. Exact in decimal.
    pub fn move_point_left(&self, places: i32) -> Self {
        let shift = DBig::from_parts(IBig::ONE, -(places as isize));
        Self::from_dbig(&self.value * &shift, self.precision_digits)
    }

    /// Multiply by 10^places. Exact in decimal.
    pub fn move_point_right(&self, places: i32) -> Self {
        self.move_point_left(-places)
    }

    /// Approximate base-10 logarithm of the magnitude, valid far outside
    /// the f64 range. Returns negative infinity for zero.
    pub fn log10_approx(&self) -> f64 {
        if self.is_zero() {
            return f64::NEG_INFINITY;
        }
        let mut scaled = self.abs();
        let mut shifted = 0i64;
        for _ in 0..64 {
            let v = scaled.to_f64();
            if v == 0.0 || v < f64::MIN_POSITIVE {
                scaled = scaled.move_point_right(300);
                shifted -= 300;
            } else if v.is_infinite() {
                scaled = scaled.move_point_left(300);
                shifted += 300;
            } else {
                return v.log10() + shifted as f64;
            }
        }
        f64::NEG_INFINITY
    }

    /// Plain decimal rendering, suitable for the viewport state file.
    pub fn to_plain_string(&self) -> String {
        self.value.to_string()
    }
}

impl PartialEq for BigDecimal {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value
    }
}

impl PartialOrd for BigDecimal {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        self.value.partial_cmp(&other.value)
    }
}

impl std::fmt::Display for BigDecimal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.value)
    }
}

#[derive(Serialize, Deserialize)]
struct BigDecimalSerde {
    value: String,
    precision_digits: usize,
}

impl Serialize for BigDecimal {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        BigDecimalSerde {
            value: self.to_plain_string(),
            precision_digits: self.precision_digits,
        }
        .serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for BigDecimal {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let serde = BigDecimalSerde::deserialize(deserializer)?;
        BigDecimal::from_string(&serde.value, serde.precision_digits)
            .map_err(serde::de::Error::custom)
    }
}
