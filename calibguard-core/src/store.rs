//! Session-Scoped Manager Registry
//!
//! One [`CalibrationManager`] tracks one venue/session context. This store
//! owns the managers for all live contexts, keyed by
//! (`venue_id`, `session_id`), and is injected into the owning service
//! rather than living as process-global state - its lifecycle is the
//! service's lifecycle, and tests get an isolated store each.
//!
//! Managers are handed out as `Arc`s: producers and evaluators for the same
//! session share one manager, and `remove` only drops the store's reference,
//! letting in-flight holders finish.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::{
    config::{DecayConfig, EnvWeights},
    decay::DecayModel,
    errors::ConfigResult,
    manager::CalibrationManager,
};

/// Identifies one venue/session calibration context
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SessionKey {
    /// Venue the rig is installed at
    pub venue_id: String,
    /// Session (game/event) identifier
    pub session_id: String,
}

impl SessionKey {
    /// Build a key from venue and session identifiers
    pub fn new(venue_id: impl Into<String>, session_id: impl Into<String>) -> Self {
        Self {
            venue_id: venue_id.into(),
            session_id: session_id.into(),
        }
    }
}

/// Registry of calibration managers for live sessions
///
/// All managers created by one store share the same validated decay model
/// and environmental weights.
pub struct SessionStore {
    model: DecayModel,
    weights: EnvWeights,
    managers: Mutex<HashMap<SessionKey, Arc<CalibrationManager>>>,
}

impl SessionStore {
    /// Create a store; configuration is validated once, up front
    pub fn new(config: DecayConfig, weights: EnvWeights) -> ConfigResult<Self> {
        weights.validate()?;
        Ok(Self {
            model: DecayModel::new(config)?,
            weights,
            managers: Mutex::new(HashMap::new()),
        })
    }

    /// Create a store with the default tuning
    pub fn with_defaults() -> Self {
        Self {
            model: DecayModel::with_defaults(),
            weights: EnvWeights::default(),
            managers: Mutex::new(HashMap::new()),
        }
    }

    fn lock_managers(&self) -> MutexGuard<'_, HashMap<SessionKey, Arc<CalibrationManager>>> {
        self.managers.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Get the manager for a session, creating it on first use
    pub fn get_or_create(&self, key: &SessionKey) -> Arc<CalibrationManager> {
        let mut managers = self.lock_managers();
        managers
            .entry(key.clone())
            .or_insert_with(|| Arc::new(CalibrationManager::new(self.model, self.weights)))
            .clone()
    }

    /// Get the manager for a session if it exists
    pub fn get(&self, key: &SessionKey) -> Option<Arc<CalibrationManager>> {
        self.lock_managers().get(key).cloned()
    }

    /// All managers for a venue, across its sessions
    ///
    /// Environment observations arrive per venue, not per session, so they
    /// fan out to every live session at that venue.
    pub fn venue_managers(&self, venue_id: &str) -> Vec<Arc<CalibrationManager>> {
        self.lock_managers()
            .iter()
            .filter(|(key, _)| key.venue_id == venue_id)
            .map(|(_, manager)| manager.clone())
            .collect()
    }

    /// Drop the store's reference to a session's manager
    pub fn remove(&self, key: &SessionKey) -> Option<Arc<CalibrationManager>> {
        self.lock_managers().remove(key)
    }

    /// Number of live sessions
    pub fn len(&self) -> usize {
        self.lock_managers().len()
    }

    /// Whether any session is live
    pub fn is_empty(&self) -> bool {
        self.lock_managers().is_empty()
    }
}
