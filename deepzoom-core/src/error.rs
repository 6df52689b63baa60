//! Error types for the core crate.

use thiserror::Error;

/// A numeric or preset string could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("invalid decimal {value:?}: {reason}")]
    Decimal { value: String, reason: String },

    #[error("invalid integer {value:?}")]
    Integer { value: String },

    #[error("invalid float {value:?}")]
    Float { value: String },

    #[error("preset is missing the `{0}=` field")]
    MissingField(&'static str),

    #[error("unknown preset field `{0}`")]
    UnknownField(String),

    #[error("invalid colour mask {0:?}, expected six hex digits")]
    ColorMask(String),

    #[error("unknown preset {0:?}")]
    UnknownPreset(String),
}

/// Failures while reading or writing the viewport state file.
#[derive(Debug, Error)]
pub enum ViewportError {
    #[error("viewport file I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("viewport file has {found} lines, expected {expected}")]
    Truncated { found: usize, expected: usize },

    #[error(transparent)]
    Parse(#[from] ParseError),
}
