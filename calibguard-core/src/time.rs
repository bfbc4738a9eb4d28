//! Time handling for calibration tracking
//!
//! Provides a clock abstraction so the manager can be driven by wall-clock
//! time in production and by a fixed clock in tests. Elapsed time is always
//! measured in minutes since the active calibration epoch; negative spans
//! (clock skew, late-arriving queries stamped before the calibration instant)
//! clamp to zero rather than letting confidence "increase" by querying the
//! past.

/// Timestamp in milliseconds since epoch (or service start for monotonic sources)
pub type Timestamp = u64;

/// Milliseconds per minute, for elapsed-time conversion
const MS_PER_MINUTE: f32 = 60_000.0;

/// Minutes elapsed between two timestamps
///
/// Saturates at zero when `later` precedes `earlier` - a skewed clock must
/// never make confidence grow.
pub fn minutes_between(earlier: Timestamp, later: Timestamp) -> f32 {
    later.saturating_sub(earlier) as f32 / MS_PER_MINUTE
}

/// Source of time for the engine
pub trait TimeSource {
    /// Get current timestamp in milliseconds
    fn now(&self) -> Timestamp;

    /// Check if this source provides wall clock time (vs monotonic)
    fn is_wall_clock(&self) -> bool;
}

/// System time source (requires std)
#[cfg(feature = "std")]
#[derive(Debug, Clone, Default)]
pub struct SystemClock;

#[cfg(feature = "std")]
impl TimeSource for SystemClock {
    fn now(&self) -> Timestamp {
        use std::time::{SystemTime, UNIX_EPOCH};

        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis() as Timestamp
    }

    fn is_wall_clock(&self) -> bool {
        true
    }
}

/// Fixed time source for testing
#[derive(Debug, Clone)]
pub struct FixedClock {
    timestamp: Timestamp,
}

impl FixedClock {
    /// Create a clock frozen at `timestamp`
    pub fn new(timestamp: Timestamp) -> Self {
        Self { timestamp }
    }

    /// Jump to an absolute timestamp
    pub fn set(&mut self, timestamp: Timestamp) {
        self.timestamp = timestamp;
    }

    /// Advance the clock by `ms` milliseconds
    pub fn advance(&mut self, ms: u64) {
        self.timestamp += ms;
    }

    /// Advance the clock by whole minutes
    pub fn advance_minutes(&mut self, minutes: u64) {
        self.timestamp += minutes * 60_000;
    }
}

impl TimeSource for FixedClock {
    fn now(&self) -> Timestamp {
        self.timestamp
    }

    fn is_wall_clock(&self) -> bool {
        false
    }
}
