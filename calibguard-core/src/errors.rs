//! Error Types for Engine Configuration
//!
//! ## Design Philosophy
//!
//! The decision engine itself is total: once constructed it always produces an
//! assessment, erring toward the conservative `ALERT` classification when
//! inputs are missing or stale (see [`crate::manager`]). The only fallible
//! surface is construction — a config with a non-positive half-life or a
//! confidence outside (0, 1] would make the decay math meaningless, so it is
//! rejected up front rather than clamped silently.
//!
//! Error values follow the same rules as the rest of the crate:
//!
//! 1. **Small and inline**: no heap allocation, `&'static str` parameter
//!    names only, so errors stay `Copy` and cheap to return.
//! 2. **Actionable**: each variant carries the offending value and the
//!    accepted bounds so the caller can report it without further queries.

use thiserror_no_std::Error;

/// Result type for configuration validation
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Configuration errors - kept small, no heap allocation
#[derive(Error, Debug, Clone, Copy, PartialEq)]
pub enum ConfigError {
    /// Parameter outside its accepted range
    #[error("{param} = {value} outside range [{min}, {max}]")]
    OutOfRange {
        /// Name of the rejected parameter
        param: &'static str,
        /// The value that was supplied
        value: f32,
        /// Minimum accepted value
        min: f32,
        /// Maximum accepted value
        max: f32,
    },

    /// Parameter is not a finite number (NaN, infinity)
    #[error("{param} is not a finite number")]
    InvalidValue {
        /// Name of the rejected parameter
        param: &'static str,
    },
}

/// Check that a parameter is finite and within `[min, max]`
pub(crate) fn check_param(param: &'static str, value: f32, min: f32, max: f32) -> ConfigResult<()> {
    if !value.is_finite() {
        return Err(ConfigError::InvalidValue { param });
    }
    if value < min || value > max {
        return Err(ConfigError::OutOfRange {
            param,
            value,
            min,
            max,
        });
    }
    Ok(())
}
