//! Serializable snapshots of a running engine.
//!
//! A snapshot captures where an engine is, not how it got its definition:
//! handlers and the definition itself are rebuilt by the owner, then
//! [`Ftsm::restore`](crate::engine::Ftsm::restore) puts the engine back in
//! place.

use crate::core::TransitionRecord;
use crate::engine::RecoveryCounter;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub mod error;

pub use error::SnapshotError;

/// Version identifier for snapshot format
pub const SNAPSHOT_VERSION: u32 = 1;

/// Runtime position of an engine.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EngineSnapshot {
    /// Snapshot format version
    pub version: u32,

    /// Unique snapshot identifier
    pub id: Uuid,

    /// When the snapshot was taken
    pub timestamp: DateTime<Utc>,

    /// Name of the engine
    pub machine: String,

    /// State the engine was in
    pub current_state: String,

    /// Recovery attempts within the current failure episode
    pub recovery: RecoveryCounter,

    /// Whether the engine had stopped accepting ticks
    pub terminated: bool,

    /// Retained transition history, oldest first
    pub history: Vec<TransitionRecord>,
}

impl EngineSnapshot {
    pub(crate) fn new(
        machine: String,
        current_state: String,
        recovery: RecoveryCounter,
        terminated: bool,
        history: Vec<TransitionRecord>,
    ) -> Self {
        Self {
            version: SNAPSHOT_VERSION,
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            machine,
            current_state,
            recovery,
            terminated,
            history,
        }
    }

    pub fn to_json(&self) -> Result<String, SnapshotError> {
        serde_json::to_string_pretty(self)
            .map_err(|e| SnapshotError::SerializationFailed(e.to_string()))
    }

    pub fn from_json(json: &str) -> Result<Self, SnapshotError> {
        let snapshot: Self = serde_json::from_str(json)
            .map_err(|e| SnapshotError::DeserializationFailed(e.to_string()))?;
        snapshot.check_version()
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, SnapshotError> {
        bincode::serialize(self).map_err(|e| SnapshotError::SerializationFailed(e.to_string()))
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, SnapshotError> {
        let snapshot: Self = bincode::deserialize(bytes)
            .map_err(|e| SnapshotError::DeserializationFailed(e.to_string()))?;
        snapshot.check_version()
    }

    fn check_version(self) -> Result<Self, SnapshotError> {
        if self.version != SNAPSHOT_VERSION {
            return Err(SnapshotError::UnsupportedVersion {
                found: self.version,
                supported: SNAPSHOT_VERSION,
            });
        }
        Ok(self)
    }
}
