//! Message-Bus Payloads and Routing
//!
//! ## Boundary
//!
//! The engine consumes two event families from the venue message bus:
//!
//! | Topic                    | Payload                      | Routed to              |
//! |--------------------------|------------------------------|------------------------|
//! | `calibration.status.v1`  | [`CalibrationStatusPayload`] | `record_calibration`   |
//! | `env.<venue>.v1`         | [`EnvObservationPayload`]    | `record_environment`   |
//!
//! Per-pitch tracking telemetry (`statcast.pitch.v1`) is aggregated by the
//! consuming pipeline into the QA score passed to `evaluate`; the engine
//! does not subscribe to it directly, and it never publishes - assessments
//! are returned synchronously to whoever asked.
//!
//! ## Tolerance
//!
//! Payloads arrive as JSON with camelCase keys. Unknown keys are ignored and
//! missing environmental readings deserialize to `None` - an absent factor
//! is "unknown", never a decode failure (the bus carries more fields than
//! this engine cares about).

use serde::{Deserialize, Serialize};
use thiserror_no_std::Error;

use crate::{
    environment::EnvSnapshot,
    store::{SessionKey, SessionStore},
    time::Timestamp,
};

/// Topic carrying calibration status events
pub const TOPIC_CALIBRATION_STATUS: &str = "calibration.status.v1";

/// Topic carrying per-pitch tracking telemetry (consumed upstream, not here)
pub const TOPIC_PITCH_TELEMETRY: &str = "statcast.pitch.v1";

/// Environment topic for a venue: `env.<venue>.v1`
pub fn env_topic(venue_id: &str) -> String {
    format!("env.{venue_id}.v1")
}

/// Errors raised while decoding bus payloads
#[derive(Debug, Error)]
pub enum PayloadError {
    /// Payload was not valid JSON for the topic's schema
    #[error("malformed payload: {0}")]
    Malformed(#[from] serde_json::Error),

    /// Topic does not belong to this engine
    #[error("unrecognized topic: {0}")]
    UnknownTopic(String),
}

/// Payload of `calibration.status.v1`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalibrationStatusPayload {
    /// Venue the calibration happened at
    pub venue_id: String,
    /// Session the calibration belongs to
    pub session_id: String,
    /// Instant the calibration was detected, epoch milliseconds
    pub detected_ts: Timestamp,
    /// Confidence assigned by the calibration procedure
    pub calibration_confidence: f32,
    /// Free-form action label from the producer; informational only
    #[serde(default)]
    pub action: Option<String>,
}

/// Payload of `env.<venue>.v1`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnvObservationPayload {
    /// Venue the observation was taken at
    pub venue_id: String,
    /// Observation instant, epoch milliseconds
    pub obs_ts: Timestamp,
    /// Ambient temperature in Fahrenheit
    #[serde(default)]
    pub temperature_f: Option<f32>,
    /// Relative humidity percentage
    #[serde(default)]
    pub humidity_pct: Option<f32>,
    /// Wind speed in mph
    #[serde(default)]
    pub wind_mph: Option<f32>,
    /// Normalized rig vibration index
    #[serde(default, rename = "rigVibrationIdx0to1")]
    pub rig_vibration_idx: Option<f32>,
}

impl EnvObservationPayload {
    /// The snapshot this observation contributes to the manager
    pub fn snapshot(&self) -> EnvSnapshot {
        EnvSnapshot {
            temperature_f: self.temperature_f,
            humidity_pct: self.humidity_pct,
            wind_mph: self.wind_mph,
            rig_vibration_idx: self.rig_vibration_idx,
        }
    }
}

/// A decoded bus event addressed to this engine
#[derive(Debug, Clone, PartialEq)]
pub enum RigEvent {
    /// A calibration was performed
    CalibrationStatus(CalibrationStatusPayload),
    /// Ambient conditions were observed
    EnvObservation(EnvObservationPayload),
}

/// Decode a raw bus message by topic
pub fn decode(topic: &str, payload: &[u8]) -> Result<RigEvent, PayloadError> {
    if topic == TOPIC_CALIBRATION_STATUS {
        return Ok(RigEvent::CalibrationStatus(serde_json::from_slice(payload)?));
    }
    if topic.starts_with("env.") && topic.ends_with(".v1") {
        return Ok(RigEvent::EnvObservation(serde_json::from_slice(payload)?));
    }
    Err(PayloadError::UnknownTopic(topic.to_owned()))
}

/// Route a decoded event to the managers it concerns
///
/// Calibration events create the session context on first sight.
/// Environment observations arrive per venue and fan out to every live
/// session at that venue; with no live session they are dropped - there is
/// no epoch for them to matter to yet.
pub fn apply(store: &SessionStore, event: &RigEvent) {
    match event {
        RigEvent::CalibrationStatus(payload) => {
            let key = SessionKey::new(&payload.venue_id, &payload.session_id);
            store.get_or_create(&key).record_calibration(
                &payload.venue_id,
                &payload.session_id,
                payload.calibration_confidence,
                payload.detected_ts,
            );
        }
        RigEvent::EnvObservation(payload) => {
            let snapshot = payload.snapshot();
            for manager in store.venue_managers(&payload.venue_id) {
                manager.record_environment(snapshot);
            }
        }
    }
}
