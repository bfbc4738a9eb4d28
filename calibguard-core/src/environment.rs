//! Environmental Decay Acceleration
//!
//! ## Overview
//!
//! A rig that is shaking in the wind loses calibration faster than one
//! sitting still. This module turns an environmental observation into a
//! multiplicative speed-up of the base decay rate:
//!
//! - **Rig vibration** and **wind** act on their absolute magnitude from the
//!   newest snapshot.
//! - **Temperature** and **humidity** act on the *change* since the previous
//!   snapshot - a steady 95°F evening is fine, a 10°F drop is not.
//!
//! Each factor contributes only above its trigger threshold, scales linearly
//! with how far past the threshold it is, and saturates at its normalization
//! ceiling. Factors compose multiplicatively, so simultaneous stressors
//! compound super-linearly: a vibrating rig in high wind degrades much faster
//! than either stressor alone would suggest.
//!
//! ## Missing data
//!
//! An absent reading is *unknown*, not zero-stress: it simply contributes
//! nothing. Likewise the first observation of a session has no prior to diff
//! against, so the two delta-based factors are skipped until the second
//! observation arrives.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::config::{
    EnvWeights, HUMIDITY_DELTA_SPAN_PCT, HUMIDITY_DELTA_THRESHOLD_PCT, TEMP_DELTA_SPAN_F,
    TEMP_DELTA_THRESHOLD_F, VIBRATION_SPAN_IDX, VIBRATION_THRESHOLD_IDX, WIND_NORMALIZATION_MPH,
    WIND_THRESHOLD_MPH,
};

/// Last-observed ambient conditions at the rig
///
/// Every field is optional: sensors drop out mid-event and a partial
/// observation is still useful.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct EnvSnapshot {
    /// Ambient temperature in Fahrenheit
    pub temperature_f: Option<f32>,

    /// Relative humidity percentage
    pub humidity_pct: Option<f32>,

    /// Wind speed in mph
    pub wind_mph: Option<f32>,

    /// Normalized rig vibration index, 0 (still) to 1 (violent)
    pub rig_vibration_idx: Option<f32>,
}

impl EnvSnapshot {
    /// Compute the decay-relevant factors of this snapshot versus a prior one
    ///
    /// Temperature and humidity become signed deltas and require both
    /// readings; wind and vibration carry over as absolute magnitudes.
    pub fn delta_from(&self, prior: Option<&EnvSnapshot>) -> EnvDelta {
        let temperature_delta_f = match (self.temperature_f, prior.and_then(|p| p.temperature_f)) {
            (Some(new), Some(old)) => Some(new - old),
            _ => None,
        };
        let humidity_delta_pct = match (self.humidity_pct, prior.and_then(|p| p.humidity_pct)) {
            (Some(new), Some(old)) => Some(new - old),
            _ => None,
        };

        EnvDelta {
            temperature_delta_f,
            humidity_delta_pct,
            wind_mph: self.wind_mph,
            rig_vibration_idx: self.rig_vibration_idx,
        }
    }
}

/// Environmental factors feeding the decay-rate adjustment
///
/// Produced by [`EnvSnapshot::delta_from`]; `None` fields contribute nothing.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct EnvDelta {
    /// Signed temperature change in °F since the prior snapshot
    pub temperature_delta_f: Option<f32>,

    /// Signed humidity change in percentage points since the prior snapshot
    pub humidity_delta_pct: Option<f32>,

    /// Current wind speed in mph
    pub wind_mph: Option<f32>,

    /// Current rig vibration index (0-1)
    pub rig_vibration_idx: Option<f32>,
}

impl EnvDelta {
    /// A delta with no known factors - leaves the base rate untouched
    pub const NONE: Self = Self {
        temperature_delta_f: None,
        humidity_delta_pct: None,
        wind_mph: None,
        rig_vibration_idx: None,
    };
}

/// One factor's contribution to the rate multiplier
///
/// Zero below the threshold; otherwise `(weight - 1)` scaled by the
/// magnitude normalized against `span` and clamped to [0, 1].
fn factor_multiplier(magnitude: f32, threshold: f32, span: f32, weight: f32) -> f32 {
    if !magnitude.is_finite() || magnitude <= threshold {
        return 1.0;
    }

    let normalized = (magnitude / span).clamp(0.0, 1.0);
    1.0 + (weight - 1.0) * normalized
}

/// Adjust the base decay rate for environmental stress
///
/// The returned rate is always >= `base_rate`: environmental conditions can
/// only accelerate decay, never slow it below baseline.
pub fn adjusted_rate(base_rate: f32, delta: &EnvDelta, weights: &EnvWeights) -> f32 {
    let mut multiplier = 1.0f32;

    if let Some(vibration) = delta.rig_vibration_idx {
        multiplier *= factor_multiplier(
            vibration,
            VIBRATION_THRESHOLD_IDX,
            VIBRATION_SPAN_IDX,
            weights.vibration,
        );
    }

    if let Some(wind) = delta.wind_mph {
        multiplier *= factor_multiplier(
            wind,
            WIND_THRESHOLD_MPH,
            WIND_NORMALIZATION_MPH,
            weights.wind,
        );
    }

    if let Some(temp_delta) = delta.temperature_delta_f {
        multiplier *= factor_multiplier(
            temp_delta.abs(),
            TEMP_DELTA_THRESHOLD_F,
            TEMP_DELTA_SPAN_F,
            weights.temperature_delta,
        );
    }

    if let Some(humidity_delta) = delta.humidity_delta_pct {
        multiplier *= factor_multiplier(
            humidity_delta.abs(),
            HUMIDITY_DELTA_THRESHOLD_PCT,
            HUMIDITY_DELTA_SPAN_PCT,
            weights.humidity_delta,
        );
    }

    base_rate * multiplier.max(1.0)
}
