//! State definitions and the well-known lifecycle state names.
//!
//! A [`StateDefinition`] is an immutable record of a state's name and the
//! edges leaving it. Definitions are produced by the loader and never
//! modified afterwards.

use super::transition::TransitionLabel;
use serde::Serialize;
use std::collections::BTreeMap;

/// Initial state of every action machine.
pub const INIT: &str = "init";
/// Resources are being prepared.
pub const CONFIGURING: &str = "configuring";
/// Idle, waiting for an execution request.
pub const READY: &str = "ready";
/// The action body is executing.
pub const RUNNING: &str = "running";
/// A recoverable failure is being handled.
pub const RECOVERING: &str = "recovering";
/// Terminal state reached once recovery attempts are exhausted.
///
/// The engine owns this state: it never runs a handler for it, so
/// definitions may declare it as a sink without a matching handler.
pub const FAILED: &str = "failed";

/// A named state and its mapping from transition label to target state.
///
/// # Example
///
/// ```rust
/// use ftsm::core::{StateDefinition, TransitionLabel};
///
/// let ready = StateDefinition::new(
///     "ready",
///     [(TransitionLabel::Run, "running"), (TransitionLabel::Wait, "ready")],
/// );
///
/// assert_eq!(ready.target(&TransitionLabel::Run), Some("running"));
/// assert_eq!(ready.target(&TransitionLabel::Done), None);
/// assert!(!ready.is_sink());
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct StateDefinition {
    name: String,
    transitions: BTreeMap<TransitionLabel, String>,
}

impl StateDefinition {
    pub fn new<N, I, T>(name: N, transitions: I) -> Self
    where
        N: Into<String>,
        I: IntoIterator<Item = (TransitionLabel, T)>,
        T: Into<String>,
    {
        Self {
            name: name.into(),
            transitions: transitions
                .into_iter()
                .map(|(label, target)| (label, target.into()))
                .collect(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn transitions(&self) -> &BTreeMap<TransitionLabel, String> {
        &self.transitions
    }

    /// Target state of the edge with the given label, if declared.
    pub fn target(&self, label: &TransitionLabel) -> Option<&str> {
        self.transitions.get(label).map(String::as_str)
    }

    /// A sink has no outgoing transitions.
    pub fn is_sink(&self) -> bool {
        self.transitions.is_empty()
    }
}
