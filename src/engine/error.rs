//! Runtime errors of the engine.

use crate::core::TransitionLabel;
use thiserror::Error;

/// Unrecoverable errors surfaced by [`Ftsm::tick`](super::Ftsm::tick).
///
/// After any of these the engine is terminated and refuses further ticks.
#[derive(Debug, Error)]
pub enum FtsmError {
    /// A handler returned a label its own state does not declare.
    #[error("state '{state}' of '{machine}' has no transition labelled '{label}'")]
    UndeclaredTransition {
        machine: String,
        state: String,
        label: TransitionLabel,
    },

    #[error("'{machine}' failed in state '{state}' but its definition has no recovering state: {reason}")]
    NoRecoveryState {
        machine: String,
        state: String,
        reason: String,
    },

    #[error("'{machine}' exhausted recovery after {attempts} attempts (limit {limit}): {reason}")]
    RecoveryExhausted {
        machine: String,
        attempts: u32,
        limit: u32,
        reason: String,
    },

    #[error("'{machine}' has terminated in state '{state}'")]
    Terminated { machine: String, state: String },
}
