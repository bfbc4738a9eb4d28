//! Engine Configuration and Tuning Constants
//!
//! All knobs of the decision engine live here and are fixed at construction:
//! the decay curve parameters, the environmental stress weights, and the
//! trigger thresholds above which each environmental factor starts to bite.
//!
//! Defaults reproduce the behavior the engine was tuned for at a covered
//! outdoor venue: confidence starts at 0.95 after a fresh calibration and
//! halves every 45 minutes under calm conditions, never dropping below 0.5.
//!
//! Omitted telemetry defaults (QA score, late-data fraction) are deliberately
//! *not* here - they belong to the policy that consumes them, see
//! [`crate::policy`].

use crate::errors::{check_param, ConfigResult};

// ===== DECAY DEFAULTS =====

/// Confidence assigned right after a fresh calibration.
///
/// Slightly below 1.0: even a fresh calibration carries residual
/// mount/levelling uncertainty.
pub const DEFAULT_INITIAL_CONFIDENCE: f32 = 0.95;

/// Minutes for confidence to fall by 50% absent environmental stress.
///
/// Derived from observed drift of a fixed camera array over a three-hour
/// event window.
pub const DEFAULT_HALF_LIFE_MINUTES: f32 = 45.0;

/// Floor value for confidence.
///
/// Below this the output is not usable anyway; clamping here keeps the
/// downstream action bands meaningful.
pub const DEFAULT_MIN_CONFIDENCE: f32 = 0.5;

// ===== ENVIRONMENTAL TRIGGER THRESHOLDS =====

/// Rig vibration index (0-1) above which vibration accelerates decay.
pub const VIBRATION_THRESHOLD_IDX: f32 = 0.3;

/// Normalization ceiling for the vibration index.
pub const VIBRATION_SPAN_IDX: f32 = 1.0;

/// Wind speed in mph above which wind accelerates decay.
pub const WIND_THRESHOLD_MPH: f32 = 15.0;

/// Wind speed at which the wind contribution saturates.
pub const WIND_NORMALIZATION_MPH: f32 = 30.0;

/// Absolute temperature change in Fahrenheit that starts to matter.
pub const TEMP_DELTA_THRESHOLD_F: f32 = 5.0;

/// Temperature change at which the contribution saturates.
pub const TEMP_DELTA_SPAN_F: f32 = 15.0;

/// Absolute humidity change in percentage points that starts to matter.
pub const HUMIDITY_DELTA_THRESHOLD_PCT: f32 = 10.0;

/// Humidity change at which the contribution saturates.
pub const HUMIDITY_DELTA_SPAN_PCT: f32 = 30.0;

// ===== ENVIRONMENTAL WEIGHTS =====

/// Maximum decay-rate multiplier from rig vibration (doubles the rate).
pub const WEIGHT_VIBRATION: f32 = 2.0;

/// Maximum decay-rate multiplier from wind (50% faster decay).
pub const WEIGHT_WIND: f32 = 1.5;

/// Maximum decay-rate multiplier from temperature swings (30% faster).
pub const WEIGHT_TEMPERATURE_DELTA: f32 = 1.3;

/// Maximum decay-rate multiplier from humidity swings (20% faster).
pub const WEIGHT_HUMIDITY_DELTA: f32 = 1.2;

/// Parameters of the exponential confidence decay curve
///
/// Fixed at construction; validated once by [`crate::DecayModel::new`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DecayConfig {
    /// Confidence assigned at calibration time, in (0, 1]
    pub initial_confidence: f32,

    /// Minutes for confidence to halve with no environmental stress
    pub half_life_minutes: f32,

    /// Floor below which confidence never drops
    pub min_confidence: f32,
}

impl Default for DecayConfig {
    fn default() -> Self {
        Self {
            initial_confidence: DEFAULT_INITIAL_CONFIDENCE,
            half_life_minutes: DEFAULT_HALF_LIFE_MINUTES,
            min_confidence: DEFAULT_MIN_CONFIDENCE,
        }
    }
}

impl DecayConfig {
    /// Set the initial confidence
    pub fn initial_confidence(mut self, value: f32) -> Self {
        self.initial_confidence = value;
        self
    }

    /// Set the half-life in minutes
    pub fn half_life_minutes(mut self, value: f32) -> Self {
        self.half_life_minutes = value;
        self
    }

    /// Set the confidence floor
    pub fn min_confidence(mut self, value: f32) -> Self {
        self.min_confidence = value;
        self
    }

    /// Validate all parameters
    ///
    /// Rejects non-finite values, a non-positive half-life, a confidence
    /// outside (0, 1], and a floor above the initial confidence.
    pub fn validate(&self) -> ConfigResult<()> {
        check_param(
            "initial_confidence",
            self.initial_confidence,
            f32::MIN_POSITIVE,
            1.0,
        )?;
        check_param(
            "half_life_minutes",
            self.half_life_minutes,
            f32::MIN_POSITIVE,
            f32::MAX,
        )?;
        check_param(
            "min_confidence",
            self.min_confidence,
            0.0,
            self.initial_confidence,
        )?;
        Ok(())
    }
}

/// Multiplier weights for environmental decay acceleration
///
/// Each weight is the *maximum* extra multiplier a fully saturated factor
/// contributes; see [`crate::environment::adjusted_rate`] for how magnitude
/// scales the contribution. Weights below 1.0 are rejected - environmental
/// stress never slows decay below baseline.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnvWeights {
    /// Rig vibration weight (index 0-1, triggers above 0.3)
    pub vibration: f32,

    /// Wind weight (mph, triggers above 15)
    pub wind: f32,

    /// Temperature delta weight (°F, triggers above |5|)
    pub temperature_delta: f32,

    /// Humidity delta weight (%, triggers above |10|)
    pub humidity_delta: f32,
}

impl Default for EnvWeights {
    fn default() -> Self {
        Self {
            vibration: WEIGHT_VIBRATION,
            wind: WEIGHT_WIND,
            temperature_delta: WEIGHT_TEMPERATURE_DELTA,
            humidity_delta: WEIGHT_HUMIDITY_DELTA,
        }
    }
}

impl EnvWeights {
    /// Validate all weights are finite and >= 1.0
    pub fn validate(&self) -> ConfigResult<()> {
        check_param("vibration_weight", self.vibration, 1.0, f32::MAX)?;
        check_param("wind_weight", self.wind, 1.0, f32::MAX)?;
        check_param(
            "temperature_delta_weight",
            self.temperature_delta,
            1.0,
            f32::MAX,
        )?;
        check_param(
            "humidity_delta_weight",
            self.humidity_delta,
            1.0,
            f32::MAX,
        )?;
        Ok(())
    }
}
