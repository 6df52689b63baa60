use crate::{BigDecimal, BigVec2, ParseError, Vec2, MANDELBROT_CONFIG};
use serde::{Deserialize, Serialize};

/// Digits kept for shallow viewports.
const MIN_VIEWPORT_DIGITS: usize = 40;

/// Digits kept below the width's leading digit.
const WIDTH_GUARD_DIGITS: usize = 24;

/// Viewport in fractal space with arbitrary precision.
///
/// - `center`: Center point in fractal space
/// - `width`: Visible width in fractal space (height follows the screen aspect)
/// - `iteration_limit`: cap for escape iteration counts
///
/// Screen offsets ([`Vec2`]) are measured in units of `width` from the
/// centre: x grows to the right, y grows upwards, so the left and right
/// edges are at x = ∓0.5.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub center: BigVec2,
    pub width: BigDecimal,
    pub iteration_limit: u32,
}

impl Default for Viewport {
    fn default() -> Self {
        MANDELBROT_CONFIG.default_viewport()
    }
}

impl Viewport {
    pub fn new(center: BigVec2, width: BigDecimal, iteration_limit: u32) -> Self {
        Self {
            center,
            width,
            iteration_limit,
        }
    }

    /// Create new viewport from f64 values with explicit precision.
    ///
    /// Use this for tests or when f64 precision is sufficient.
    pub fn from_f64(
        center_x: f64,
        center_y: f64,
        width: f64,
        iteration_limit: u32,
        precision_digits: usize,
    ) -> Self {
        Self {
            center: BigVec2::new(
                BigDecimal::with_precision(center_x, precision_digits),
                BigDecimal::with_precision(center_y, precision_digits),
            ),
            width: BigDecimal::with_precision(width, precision_digits),
            iteration_limit,
        }
    }

    /// Create viewport from string representations (for extreme precision coordinates)
    ///
    /// The precision is chosen so that no digit of the inputs is lost and
    /// the width keeps `WIDTH_GUARD_DIGITS` digits below its leading digit
    /// relative to the centre.
    pub fn from_strings(
        center_x: &str,
        center_y: &str,
        width: &str,
        iteration_limit: u32,
    ) -> Result<Self, ParseError> {
        let longest = center_x.len().max(center_y.len()).max(width.len());
        let parsed_width = BigDecimal::from_string(width, longest + 16)?;
        let digits = digits_for_width(&parsed_width).max(longest + 16);

        Ok(Self {
            center: BigVec2::new(
                BigDecimal::from_string(center_x, digits)?,
                BigDecimal::from_string(center_y, digits)?,
            ),
            width: BigDecimal::from_string(width, digits)?,
            iteration_limit,
        })
    }

    /// Parse a named-preset string such as `s=3.0,r=-0.75,i=0,l=1024`.
    ///
    /// All four fields are required; the viewport is only built once every
    /// field parsed, so a bad preset never yields a half-applied view.
    pub fn from_preset_str(preset: &str) -> Result<Self, ParseError> {
        let mut width = None;
        let mut real = None;
        let mut imag = None;
        let mut limit = None;

        for field in preset.split(',') {
            let field = field.trim();
            if field.is_empty() {
                continue;
            }
            let (key, value) = field
                .split_once('=')
                .ok_or_else(|| ParseError::UnknownField(field.to_string()))?;
            let value = value.trim();
            match key.trim() {
                "s" => width = Some(value),
                "r" => real = Some(value),
                "i" => imag = Some(value),
                "l" => {
                    limit = Some(value.parse::<u32>().map_err(|_| ParseError::Integer {
                        value: value.to_string(),
                    })?)
                }
                other => return Err(ParseError::UnknownField(other.to_string())),
            }
        }

        Self::from_strings(
            real.ok_or(ParseError::MissingField("r"))?,
            imag.ok_or(ParseError::MissingField("i"))?,
            width.ok_or(ParseError::MissingField("s"))?,
            limit.ok_or(ParseError::MissingField("l"))?,
        )
    }

    /// Inverse of [`Viewport::from_preset_str`].
    pub fn to_preset_string(&self) -> String {
        format!(
            "s={},r={},i={},l={}",
            self.width.to_plain_string(),
            self.center.x.to_plain_string(),
            self.center.y.to_plain_string(),
            self.iteration_limit
        )
    }

    /// Get the precision digits of this viewport
    pub fn precision_digits(&self) -> usize {
        self.width.precision_digits()
    }

    /// Re-round every coordinate to `precision_digits`.
    pub fn with_precision_digits(&self, precision_digits: usize) -> Self {
        Self {
            center: self.center.with_precision_digits(precision_digits),
            width: self.width.with_precision_digits(precision_digits),
            iteration_limit: self.iteration_limit,
        }
    }

    /// World coordinate of a screen offset: `center + offset · width`.
    pub fn to_world(&self, offset: Vec2) -> BigVec2 {
        let digits = self.precision_digits();
        let offset = BigVec2::from_vec2(offset, digits);
        self.center.add(&offset.scale(&self.width))
    }

    /// Screen offset of a world coordinate: `(point - center) / width`.
    pub fn to_screen(&self, point: &BigVec2) -> Vec2 {
        let relative = point.sub(&self.center);
        Vec2::new(
            relative.x.div(&self.width).to_f64(),
            relative.y.div(&self.width).to_f64(),
        )
    }

    /// Screen offset of a continuous pixel position on a `screen`-sized canvas.
    pub fn pixel_to_offset(px: f64, py: f64, screen: (u32, u32)) -> Vec2 {
        let w = screen.0.max(1) as f64;
        let h = screen.1 as f64;
        Vec2::new((px - w / 2.0) / w, (h / 2.0 - py) / w)
    }

    /// Continuous pixel position of a screen offset.
    pub fn offset_to_pixel(offset: Vec2, screen: (u32, u32)) -> (f64, f64) {
        let w = screen.0.max(1) as f64;
        let h = screen.1 as f64;
        (offset.x * w + w / 2.0, h / 2.0 - offset.y * w)
    }

    /// Height in screen-offset units for a canvas aspect.
    pub fn half_extent(screen: (u32, u32)) -> Vec2 {
        let w = screen.0.max(1) as f64;
        Vec2::new(0.5, screen.1 as f64 / w / 2.0)
    }
}

/// Digits needed to keep a viewport of this width well resolved.
pub fn digits_for_width(width: &BigDecimal) -> usize {
    let log10 = width.log10_approx();
    let below = if log10.is_finite() && log10 < 0.0 {
        (-log10).ceil() as usize
    } else {
        0
    };
    (below + WIDTH_GUARD_DIGITS).max(MIN_VIEWPORT_DIGITS)
}
