//! Action Classification and Recalibration Policy
//!
//! ## Two decisions, two functions
//!
//! The engine produces two independent outputs from one confidence value:
//!
//! 1. [`Action::classify`] - what the consuming pipeline should do *right
//!    now*, a total threshold function of confidence alone.
//! 2. [`recommend`] - whether a recalibration should be scheduled, a
//!    composite policy over confidence plus external quality telemetry.
//!
//! The composite policy deliberately requires corroboration: apart from the
//! hard confidence floor, no single noisy signal can trigger a
//! recalibration on its own. A poor QA score only counts once calibration
//! confidence is also declining, and high arrival latency only counts
//! alongside measurable drift.
//!
//! ## Machine-readable reasons
//!
//! Reasons are a closed enum with structured fields rather than interpolated
//! strings, so downstream alert routing can match on them; `Display` renders
//! the operator-facing text.

use core::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

// ===== ACTION BANDS =====

/// Confidence at or above which no action is needed.
pub const ACTION_NONE_FLOOR: f32 = 0.80;

/// Confidence at or above which a soft rebaseline suffices.
pub const ACTION_REBASELINE_FLOOR: f32 = 0.70;

/// Confidence at or above which fallback tracking is the answer.
pub const ACTION_FALLBACK_FLOOR: f32 = 0.60;

// ===== RECALIBRATION RULES =====

/// Confidence below which recalibration is unconditional (rule 1).
pub const RECAL_CONFIDENCE_FLOOR: f32 = 0.60;

/// QA score below which quality corroborates recalibration (rule 2).
pub const RECAL_QA_THRESHOLD: f32 = 0.70;

/// Confidence ceiling for the quality-corroborated rule (rule 2).
pub const RECAL_QA_CONFIDENCE_CEILING: f32 = 0.80;

/// Late-data fraction above which latency corroborates recalibration (rule 3).
pub const RECAL_LATE_THRESHOLD: f32 = 0.30;

/// Confidence ceiling for the latency-corroborated rule (rule 3).
pub const RECAL_LATE_CONFIDENCE_CEILING: f32 = 0.75;

// ===== TELEMETRY DEFAULTS =====

/// QA score substituted when tracking quality telemetry is absent.
///
/// Optimistic on purpose: missing instrumentation must not itself raise
/// alerts. The cost is that "quality is good" and "quality is unmeasured"
/// are indistinguishable to the policy - callers that care keep the
/// [`TelemetrySignals`] fields `None` visible at the call site.
pub const DEFAULT_QA_SCORE: f32 = 0.9;

/// Late-data fraction substituted when pipeline latency telemetry is absent.
pub const DEFAULT_LATE_DATA_FRAC: f32 = 0.05;

/// Discrete corrective action, classified from confidence alone
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "SCREAMING_SNAKE_CASE"))]
pub enum Action {
    /// Calibration is trustworthy, keep going
    None,
    /// Refresh the baseline from recent known-good data, no full stop
    Rebaseline,
    /// Switch the consuming pipeline to the backup tracking source
    Fallback,
    /// Manual intervention required
    Alert,
}

impl Action {
    /// Classify confidence into an action band, evaluated high to low
    ///
    /// Total over all f32 inputs: NaN fails every band check and lands on
    /// `Alert`, the fail-closed default.
    pub fn classify(confidence: f32) -> Self {
        if confidence >= ACTION_NONE_FLOOR {
            Action::None
        } else if confidence >= ACTION_REBASELINE_FLOOR {
            Action::Rebaseline
        } else if confidence >= ACTION_FALLBACK_FLOOR {
            Action::Fallback
        } else {
            Action::Alert
        }
    }

    /// Wire/label representation
    pub const fn as_str(&self) -> &'static str {
        match self {
            Action::None => "NONE",
            Action::Rebaseline => "REBASELINE",
            Action::Fallback => "FALLBACK",
            Action::Alert => "ALERT",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Externally supplied quality telemetry for the recalibration policy
///
/// Both fields are optional so that omission is explicit at the call site
/// instead of silently substituted by the caller. The policy itself applies
/// [`DEFAULT_QA_SCORE`] and [`DEFAULT_LATE_DATA_FRAC`] in exactly one place.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TelemetrySignals {
    /// Aggregated tracking QA score from the upstream pipeline, 0-1
    pub qa_score: Option<f32>,

    /// Fraction of events arriving past their delivery window, 0-1
    pub late_data_frac: Option<f32>,
}

impl TelemetrySignals {
    /// Signals with both measurements present
    pub fn measured(qa_score: f32, late_data_frac: f32) -> Self {
        Self {
            qa_score: Some(qa_score),
            late_data_frac: Some(late_data_frac),
        }
    }

    /// QA score, or the optimistic default when unmeasured
    pub fn qa_score_or_default(&self) -> f32 {
        self.qa_score.unwrap_or(DEFAULT_QA_SCORE)
    }

    /// Late-data fraction, or the optimistic default when unmeasured
    pub fn late_data_frac_or_default(&self) -> f32 {
        self.late_data_frac.unwrap_or(DEFAULT_LATE_DATA_FRAC)
    }
}

/// Why the policy did (or did not) recommend recalibration
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "kind", rename_all = "snake_case"))]
pub enum RecalibrationReason {
    /// Rule 1: confidence fell through the hard floor
    LowConfidence {
        /// The confidence that triggered the rule
        confidence: f32,
    },
    /// Rule 2: poor tracking QA corroborated by declining confidence
    DegradedQuality {
        /// The low QA score
        qa_score: f32,
        /// The declining confidence
        confidence: f32,
    },
    /// Rule 3: high arrival latency corroborated by calibration drift
    HighLatency {
        /// Fraction of late-arriving events
        late_data_frac: f32,
        /// The drifting confidence
        confidence: f32,
    },
    /// No rule fired
    Acceptable,
    /// No calibration epoch has ever been recorded
    NoCalibration,
}

impl fmt::Display for RecalibrationReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LowConfidence { confidence } => {
                write!(f, "Low calibration confidence: {confidence:.2}")
            }
            Self::DegradedQuality { qa_score, confidence } => {
                write!(
                    f,
                    "Low QA + declining calibration: QA={qa_score:.2}, Cal={confidence:.2}"
                )
            }
            Self::HighLatency { late_data_frac, confidence } => {
                write!(
                    f,
                    "High latency + calibration drift: Late={late_data_frac:.2}, Cal={confidence:.2}"
                )
            }
            Self::Acceptable => f.write_str("Calibration acceptable"),
            Self::NoCalibration => f.write_str("No calibration found"),
        }
    }
}

/// Evaluate the recalibration rules in order, first true wins
pub fn recommend(confidence: f32, signals: &TelemetrySignals) -> (bool, RecalibrationReason) {
    let qa_score = signals.qa_score_or_default();
    let late_data_frac = signals.late_data_frac_or_default();

    if confidence < RECAL_CONFIDENCE_FLOOR {
        return (true, RecalibrationReason::LowConfidence { confidence });
    }

    if qa_score < RECAL_QA_THRESHOLD && confidence < RECAL_QA_CONFIDENCE_CEILING {
        return (
            true,
            RecalibrationReason::DegradedQuality {
                qa_score,
                confidence,
            },
        );
    }

    if late_data_frac > RECAL_LATE_THRESHOLD && confidence < RECAL_LATE_CONFIDENCE_CEILING {
        return (
            true,
            RecalibrationReason::HighLatency {
                late_data_frac,
                confidence,
            },
        );
    }

    (false, RecalibrationReason::Acceptable)
}

/// Snapshot of one confidence evaluation
///
/// Immutable value object, freshly computed per query, never stored.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ConfidenceAssessment {
    /// Current calibration confidence, within [min_confidence, 1.0]
    pub confidence: f32,

    /// Corrective action for the consuming pipeline
    pub action: Action,

    /// Whether a recalibration should be scheduled
    pub should_recalibrate: bool,

    /// Structured justification for the recommendation
    pub reason: RecalibrationReason,

    /// Minutes since the active calibration epoch; `None` before the first
    /// calibration
    pub minutes_since_calibration: Option<f32>,
}
