//! Exponential Confidence Decay
//!
//! ## Model
//!
//! Calibration trust erodes continuously after the calibration instant:
//!
//! ```text
//! confidence(t) = initial × exp(-λ × t)
//! λ = ln(2) / half_life_minutes
//! ```
//!
//! so with no environmental stress the confidence halves every
//! `half_life_minutes`. The result is floored at the configured minimum and
//! elapsed time is clamped at zero - querying "before" the calibration
//! instant (clock skew) must not report more trust than the calibration
//! itself.
//!
//! ## Purity
//!
//! Everything here is pure and total: no failure modes once the model is
//! constructed, no state, no allocation. `libm::expf` keeps this module
//! usable without `std`.

use crate::{
    config::DecayConfig,
    errors::ConfigResult,
};

/// Precomputed exponential decay model
///
/// Holds the validated config plus the derived decay rate so the hot path
/// does no logarithms.
#[derive(Debug, Clone, Copy)]
pub struct DecayModel {
    config: DecayConfig,
    decay_rate: f32,
}

impl DecayModel {
    /// Build a model from a validated config
    pub fn new(config: DecayConfig) -> ConfigResult<Self> {
        config.validate()?;
        Ok(Self {
            decay_rate: core::f32::consts::LN_2 / config.half_life_minutes,
            config,
        })
    }

    /// Build a model with the default tuning
    ///
    /// The defaults are statically valid, so this cannot fail.
    pub fn with_defaults() -> Self {
        let config = DecayConfig::default();
        Self {
            decay_rate: core::f32::consts::LN_2 / config.half_life_minutes,
            config,
        }
    }

    /// Base decay rate λ in 1/minutes
    pub fn decay_rate(&self) -> f32 {
        self.decay_rate
    }

    /// The config this model was built from
    pub fn config(&self) -> &DecayConfig {
        &self.config
    }

    /// Confidence after `minutes_elapsed` at the base decay rate
    pub fn confidence_at(&self, minutes_elapsed: f32) -> f32 {
        self.confidence_from(self.config.initial_confidence, self.decay_rate, minutes_elapsed)
    }

    /// Confidence decayed from `initial` at an (possibly environmentally
    /// adjusted) `rate`
    ///
    /// Negative or non-finite elapsed time clamps to zero; the result is
    /// floored at the configured minimum confidence.
    pub fn confidence_from(&self, initial: f32, rate: f32, minutes_elapsed: f32) -> f32 {
        let minutes = if minutes_elapsed.is_finite() {
            minutes_elapsed.max(0.0)
        } else {
            0.0
        };

        let confidence = initial * libm::expf(-rate * minutes);
        confidence.max(self.config.min_confidence)
    }
}
