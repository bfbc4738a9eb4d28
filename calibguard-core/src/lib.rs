//! Calibration confidence engine for CalibGuard
//!
//! Tracks how much a tracking rig's spatial calibration can still be trusted
//! as time passes after the last calibration event, and decides what to do
//! about it. Confidence decays exponentially from the moment of calibration;
//! environmental stress (rig vibration, wind, temperature and humidity swings)
//! accelerates the decay, and a multi-criteria policy turns the resulting
//! confidence into a discrete corrective action.
//!
//! Key constraints:
//! - The evaluation path is total: every input combination produces an
//!   assessment, never a panic or a hard failure
//! - Pure math modules run without `std` (decay, environment, policy)
//! - Evaluation holds the state lock only long enough to read a consistent
//!   (epoch, snapshot) pair; all math happens outside the lock
//!
//! ```
//! use calibguard_core::{CalibrationManager, TelemetrySignals};
//!
//! let manager = CalibrationManager::with_defaults();
//! manager.record_calibration("busch_iii", "game_2025_08_15", 0.95, 0);
//!
//! // 20 minutes later, no environmental stress reported
//! let assessment = manager.evaluate(20 * 60_000, None, &TelemetrySignals::default());
//! assert!(assessment.confidence > 0.5);
//! ```

#![cfg_attr(not(feature = "std"), no_std)]
#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod config;
pub mod decay;
pub mod environment;
pub mod errors;
pub mod policy;
pub mod time;

#[cfg(feature = "std")]
pub mod events;
#[cfg(feature = "std")]
pub mod manager;
#[cfg(feature = "std")]
pub mod store;

// Public API
pub use config::{DecayConfig, EnvWeights};
pub use decay::DecayModel;
pub use environment::{adjusted_rate, EnvDelta, EnvSnapshot};
pub use errors::{ConfigError, ConfigResult};
pub use policy::{Action, ConfidenceAssessment, RecalibrationReason, TelemetrySignals};

#[cfg(feature = "std")]
pub use manager::{CalibrationEpoch, CalibrationManager};
#[cfg(feature = "std")]
pub use store::{SessionKey, SessionStore};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
