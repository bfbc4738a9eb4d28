//! Calibration Lifecycle Manager
//!
//! ## Overview
//!
//! [`CalibrationManager`] is the stateful orchestrator that threads the pure
//! components together over a live event: calibration events reset the decay
//! clock, environment observations update ambient context, and `evaluate`
//! composes decay → environmental adjustment → action classification →
//! recalibration policy into one [`ConfidenceAssessment`].
//!
//! ## State machine
//!
//! Conceptually two states per venue/session context:
//!
//! ```text
//! UNINITIALIZED ──record_calibration──► CALIBRATED ──┐
//!       │                                   ▲        │ record_calibration
//!       │ evaluate                          └────────┘ (re-entrant, resets
//!       ▼                                              the decay clock,
//! fail-closed default                                  keeps history)
//! (min confidence, ALERT)
//! ```
//!
//! ## Concurrency
//!
//! Three producers (calibration, environment, quality telemetry) and at
//! least one evaluator share a manager. The two mutable fields - the
//! append-only epoch history and the last environmental snapshot - live
//! behind one mutex. `evaluate` holds that lock only long enough to read a
//! consistent (epoch, snapshot) pair and swap in a newer snapshot; the
//! decay math runs outside the lock, so read throughput is not gated by
//! writer arrival rate. A poisoned lock is recovered with `into_inner`:
//! both fields are always in a valid state after any single mutation, so
//! there is no torn state to fear and no reason to propagate a panic.

use std::sync::{Mutex, MutexGuard, PoisonError};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{
    config::{DecayConfig, EnvWeights},
    decay::DecayModel,
    environment::{adjusted_rate, EnvDelta, EnvSnapshot},
    errors::ConfigResult,
    policy::{recommend, Action, ConfidenceAssessment, RecalibrationReason, TelemetrySignals},
    time::{minutes_between, Timestamp},
};

/// Confidence below which evaluations log a warning
const LOW_CONFIDENCE_WARN: f32 = 0.7;

/// One calibration event: a reset point for the decay clock
///
/// Created exactly once per calibration action, never mutated, superseded by
/// the next epoch, retained indefinitely in the history.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CalibrationEpoch {
    /// Venue the rig is installed at
    pub venue_id: String,

    /// Session (game/event) the calibration belongs to
    pub session_id: String,

    /// Instant the calibration was performed
    pub timestamp: Timestamp,

    /// Confidence assigned at calibration time
    pub initial_confidence: f32,
}

/// The two mutable fields, guarded together so an evaluation never sees a
/// half-updated pair.
struct ManagerState {
    /// Append-only calibration history; the last entry is the active epoch
    epochs: Vec<CalibrationEpoch>,
    /// Last-observed ambient conditions
    last_env: Option<EnvSnapshot>,
}

/// Stateful calibration confidence manager
///
/// The only component exposed to external collaborators. Thread-safe: share
/// it behind an `Arc` between producers and evaluators.
pub struct CalibrationManager {
    model: DecayModel,
    weights: EnvWeights,
    state: Mutex<ManagerState>,
}

impl CalibrationManager {
    /// Create a manager from a prebuilt decay model and weights
    pub fn new(model: DecayModel, weights: EnvWeights) -> Self {
        Self {
            model,
            weights,
            state: Mutex::new(ManagerState {
                epochs: Vec::new(),
                last_env: None,
            }),
        }
    }

    /// Create a manager from raw configuration
    pub fn with_config(config: DecayConfig, weights: EnvWeights) -> ConfigResult<Self> {
        weights.validate()?;
        Ok(Self::new(DecayModel::new(config)?, weights))
    }

    /// Create a manager with the default tuning
    pub fn with_defaults() -> Self {
        Self::new(DecayModel::with_defaults(), EnvWeights::default())
    }

    /// The decay model driving this manager
    pub fn model(&self) -> &DecayModel {
        &self.model
    }

    fn lock_state(&self) -> MutexGuard<'_, ManagerState> {
        // Each critical section leaves the state valid, so recover from a
        // poisoned lock instead of propagating the panic
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Record a new calibration event
    ///
    /// Always accepted - a deliberately weak calibration is still a valid
    /// reset point. The confidence is sanitized into
    /// `[min_confidence, 1.0]` (non-finite input falls back to the
    /// configured initial confidence) so the epoch invariant holds.
    /// Epochs append in arrival order; late-arriving events are not
    /// resequenced.
    pub fn record_calibration(
        &self,
        venue_id: &str,
        session_id: &str,
        initial_confidence: f32,
        timestamp: Timestamp,
    ) {
        let config = self.model.config();
        let confidence = if initial_confidence.is_finite() {
            initial_confidence.clamp(config.min_confidence, 1.0)
        } else {
            config.initial_confidence
        };

        let epoch = CalibrationEpoch {
            venue_id: venue_id.to_owned(),
            session_id: session_id.to_owned(),
            timestamp,
            initial_confidence: confidence,
        };

        {
            let mut state = self.lock_state();
            state.epochs.push(epoch);
        }

        log::info!("calibration recorded for {venue_id}/{session_id}: confidence={confidence}");
    }

    /// Record an environment observation, returning the delta versus the
    /// prior snapshot
    ///
    /// The read-then-replace is atomic with respect to concurrent
    /// evaluations: nobody observes the new snapshot before the delta is
    /// taken.
    pub fn record_environment(&self, snapshot: EnvSnapshot) -> EnvDelta {
        let mut state = self.lock_state();
        let delta = snapshot.delta_from(state.last_env.as_ref());
        state.last_env = Some(snapshot);
        delta
    }

    /// Evaluate current calibration confidence
    ///
    /// With no epoch ever recorded this returns the fail-closed default:
    /// minimum confidence, `ALERT`, recalibration recommended. Otherwise the
    /// decay curve is adjusted for environmental stress (using the delta of
    /// `latest_env` against the stored snapshot, which is swapped in as a
    /// side effect, matching [`Self::record_environment`]) and the result is
    /// classified and run through the recalibration policy.
    pub fn evaluate(
        &self,
        now: Timestamp,
        latest_env: Option<EnvSnapshot>,
        signals: &TelemetrySignals,
    ) -> ConfidenceAssessment {
        // Short critical section: consistent (epoch, snapshot) read plus the
        // snapshot swap. Everything below the unlock is pure.
        let (active, delta) = {
            let mut state = self.lock_state();
            let active = state.epochs.last().cloned();
            let delta = match (&active, latest_env) {
                (Some(_), Some(snapshot)) => {
                    let delta = snapshot.delta_from(state.last_env.as_ref());
                    state.last_env = Some(snapshot);
                    Some(delta)
                }
                _ => None,
            };
            (active, delta)
        };

        let Some(epoch) = active else {
            return ConfidenceAssessment {
                confidence: self.model.config().min_confidence,
                action: Action::Alert,
                should_recalibrate: true,
                reason: RecalibrationReason::NoCalibration,
                minutes_since_calibration: None,
            };
        };

        let minutes = minutes_between(epoch.timestamp, now);
        let rate = match &delta {
            Some(delta) => adjusted_rate(self.model.decay_rate(), delta, &self.weights),
            None => self.model.decay_rate(),
        };
        let confidence = self.model.confidence_from(epoch.initial_confidence, rate, minutes);

        if confidence < LOW_CONFIDENCE_WARN {
            log::warn!(
                "calibration confidence low: {confidence:.3} after {minutes:.1} minutes \
                 ({venue}/{session})",
                venue = epoch.venue_id,
                session = epoch.session_id,
            );
        }

        let action = Action::classify(confidence);
        let (should_recalibrate, reason) = recommend(confidence, signals);

        ConfidenceAssessment {
            confidence,
            action,
            should_recalibrate,
            reason,
            minutes_since_calibration: Some(minutes),
        }
    }

    /// Number of calibration epochs recorded so far
    pub fn epoch_count(&self) -> usize {
        self.lock_state().epochs.len()
    }

    /// The active (most recent) calibration epoch, if any
    pub fn active_epoch(&self) -> Option<CalibrationEpoch> {
        self.lock_state().epochs.last().cloned()
    }

    /// Full calibration history in arrival order
    pub fn history(&self) -> Vec<CalibrationEpoch> {
        self.lock_state().epochs.clone()
    }

    /// The last-observed environmental snapshot, if any
    pub fn last_environment(&self) -> Option<EnvSnapshot> {
        self.lock_state().last_env
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MIN_30: Timestamp = 30 * 60_000;

    #[test]
    fn uninitialized_fails_closed() {
        let manager = CalibrationManager::with_defaults();
        let assessment = manager.evaluate(1_000, None, &TelemetrySignals::default());

        assert_eq!(assessment.confidence, 0.5);
        assert_eq!(assessment.action, Action::Alert);
        assert!(assessment.should_recalibrate);
        assert_eq!(assessment.reason, RecalibrationReason::NoCalibration);
        assert!(assessment.minutes_since_calibration.is_none());
    }

    #[test]
    fn fresh_calibration_no_stress() {
        let manager = CalibrationManager::with_defaults();
        manager.record_calibration("busch_iii", "g1", 0.95, 0);

        let assessment = manager.evaluate(0, None, &TelemetrySignals::default());
        assert_eq!(assessment.confidence, 0.95);
        assert_eq!(assessment.action, Action::None);
        assert!(!assessment.should_recalibrate);
        assert_eq!(assessment.minutes_since_calibration, Some(0.0));
    }

    #[test]
    fn half_life_boundary_clamps_and_alerts() {
        let manager = CalibrationManager::with_defaults();
        manager.record_calibration("busch_iii", "g1", 0.95, 0);

        // Raw decay at 45 min is ≈0.475, clamped to the 0.5 floor, which
        // still sits in the ALERT band
        let assessment = manager.evaluate(45 * 60_000, None, &TelemetrySignals::default());
        assert_eq!(assessment.confidence, 0.5);
        assert_eq!(assessment.action, Action::Alert);
        assert!(assessment.should_recalibrate);
    }

    #[test]
    fn vibration_stress_decays_faster() {
        let calm = CalibrationManager::with_defaults();
        let shaky = CalibrationManager::with_defaults();
        calm.record_calibration("v", "s", 0.95, 0);
        shaky.record_calibration("v", "s", 0.95, 0);

        let stressed_env = EnvSnapshot {
            rig_vibration_idx: Some(0.5),
            ..EnvSnapshot::default()
        };

        let t = 20 * 60_000;
        let baseline = calm.evaluate(t, None, &TelemetrySignals::default());
        let stressed = shaky.evaluate(t, Some(stressed_env), &TelemetrySignals::default());

        assert!(stressed.confidence < baseline.confidence);
    }

    #[test]
    fn recalibration_resets_decay_clock() {
        let manager = CalibrationManager::with_defaults();
        manager.record_calibration("v", "s", 0.95, 0);

        let before = manager.evaluate(MIN_30, None, &TelemetrySignals::default());
        assert!(before.confidence < 0.95);

        manager.record_calibration("v", "s", 0.95, MIN_30);
        let after = manager.evaluate(MIN_30, None, &TelemetrySignals::default());
        assert_eq!(after.confidence, 0.95);
        assert_eq!(manager.epoch_count(), 2);
    }

    #[test]
    fn history_is_append_only_in_arrival_order() {
        let manager = CalibrationManager::with_defaults();
        // Late-arriving event with an older timestamp is accepted as-is
        manager.record_calibration("v", "s", 0.95, 2_000);
        manager.record_calibration("v", "s", 0.90, 1_000);

        let history = manager.history();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].timestamp, 2_000);
        assert_eq!(history[1].timestamp, 1_000);
        // The late arrival is now the active epoch
        assert_eq!(manager.active_epoch().unwrap().timestamp, 1_000);
    }

    #[test]
    fn weak_calibration_is_accepted() {
        let manager = CalibrationManager::with_defaults();
        manager.record_calibration("v", "s", 0.62, 0);

        let assessment = manager.evaluate(0, None, &TelemetrySignals::default());
        assert_eq!(assessment.confidence, 0.62);
        assert_eq!(assessment.action, Action::Fallback);
    }

    #[test]
    fn non_finite_calibration_confidence_sanitized() {
        let manager = CalibrationManager::with_defaults();
        manager.record_calibration("v", "s", f32::NAN, 0);
        assert_eq!(manager.active_epoch().unwrap().initial_confidence, 0.95);
    }

    #[test]
    fn environment_swap_returns_delta() {
        let manager = CalibrationManager::with_defaults();
        let first = EnvSnapshot {
            temperature_f: Some(75.0),
            humidity_pct: Some(60.0),
            wind_mph: Some(5.0),
            rig_vibration_idx: Some(0.1),
        };
        let second = EnvSnapshot {
            temperature_f: Some(70.0),
            humidity_pct: Some(66.0),
            wind_mph: Some(12.0),
            rig_vibration_idx: Some(0.2),
        };

        let d1 = manager.record_environment(first);
        assert!(d1.temperature_delta_f.is_none());

        let d2 = manager.record_environment(second);
        assert_eq!(d2.temperature_delta_f, Some(-5.0));
        assert_eq!(d2.humidity_delta_pct, Some(6.0));
        assert_eq!(manager.last_environment(), Some(second));
    }

    #[test]
    fn evaluate_is_idempotent_without_writes() {
        let manager = CalibrationManager::with_defaults();
        manager.record_calibration("v", "s", 0.95, 0);

        let signals = TelemetrySignals::measured(0.8, 0.1);
        let a = manager.evaluate(MIN_30, None, &signals);
        let b = manager.evaluate(MIN_30, None, &signals);
        assert_eq!(a, b);
    }

    #[test]
    fn clock_skew_does_not_raise_confidence() {
        let manager = CalibrationManager::with_defaults();
        manager.record_calibration("v", "s", 0.95, 60_000);

        // Query stamped before the calibration instant
        let assessment = manager.evaluate(0, None, &TelemetrySignals::default());
        assert_eq!(assessment.confidence, 0.95);
        assert_eq!(assessment.minutes_since_calibration, Some(0.0));
    }
}
