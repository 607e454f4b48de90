//! Bounded recovery bookkeeping.

use serde::{Deserialize, Serialize};

/// Counts recovery attempts within one failure episode.
///
/// Only the engine mutates the counter: each entry into the recovering
/// state records an attempt, and the return to ready after a successful
/// recovery resets it. Once `attempts > limit` no further recovery is tried.
///
/// # Example
///
/// ```rust
/// use ftsm::engine::RecoveryCounter;
///
/// let mut counter = RecoveryCounter::new(1);
/// counter.record_attempt();
/// assert!(!counter.is_exhausted());
/// counter.record_attempt();
/// assert!(counter.is_exhausted());
/// counter.reset();
/// assert_eq!(counter.attempts(), 0);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecoveryCounter {
    attempts: u32,
    limit: u32,
}

impl RecoveryCounter {
    pub fn new(limit: u32) -> Self {
        Self { attempts: 0, limit }
    }

    /// A counter resuming mid-episode. Counts past exhaustion collapse to
    /// `limit + 1`.
    pub fn with_attempts(limit: u32, attempts: u32) -> Self {
        Self {
            attempts: attempts.min(limit.saturating_add(1)),
            limit,
        }
    }

    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }

    /// Count one more attempt and return the new total.
    pub fn record_attempt(&mut self) -> u32 {
        self.attempts = self.attempts.saturating_add(1);
        self.attempts
    }

    pub fn is_exhausted(&self) -> bool {
        self.attempts > self.limit
    }

    pub fn reset(&mut self) {
        self.attempts = 0;
    }
}
