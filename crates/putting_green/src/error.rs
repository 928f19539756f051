//! Error types and result alias for the crate.
//!
//! This module defines [`enum@crate::error::Error`] and the crate-wide [Result] alias. Variants
//! cover configuration problems detected while generating a green: invalid numeric settings,
//! unusable grid resolutions, degenerate outlines, and surface specs that would produce
//! non-finite or negative terrain. Validation findings and runtime warnings are data, not errors.
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[non_exhaustive]
#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("invalid resolution {resolution}: a grid needs at least 2 samples per side")]
    InvalidResolution { resolution: usize },

    #[error("degenerate outline: {0}")]
    DegenerateOutline(String),

    #[error("invalid surface: {0}")]
    InvalidSurface(String),

    #[error("{0}")]
    Other(String),
}

impl From<String> for Error {
    fn from(value: String) -> Self {
        Error::Other(value)
    }
}

impl From<&str> for Error {
    fn from(value: &str) -> Self {
        Error::Other(value.to_owned())
    }
}

/// Returns an [`Error::InvalidConfig`] unless `value` is finite and strictly positive.
pub(crate) fn ensure_positive(name: &str, value: f32) -> Result<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(Error::InvalidConfig(format!(
            "{name} must be finite and > 0 (got {value})"
        )))
    }
}

/// Returns an [`Error::InvalidConfig`] unless `value` is finite and not negative.
pub(crate) fn ensure_non_negative(name: &str, value: f32) -> Result<()> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(Error::InvalidConfig(format!(
            "{name} must be finite and >= 0 (got {value})"
        )))
    }
}
