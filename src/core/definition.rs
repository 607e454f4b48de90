//! Validated state machine definitions.

use super::state::StateDefinition;
use super::transition::TransitionLabel;
use serde::Serialize;

/// Recovery ceiling used when a definition does not declare one.
pub const DEFAULT_MAX_RECOVERY_ATTEMPTS: u32 = 1;

/// An ordered, validated state graph plus the action's declared requirements.
///
/// Only [`DefinitionLoader`](crate::loader::DefinitionLoader) builds these, and
/// only after proving that every transition targets a declared state. The
/// first state in declaration order is the initial state.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct StateMachineDefinition {
    name: Option<String>,
    states: Vec<StateDefinition>,
    dependencies: Vec<String>,
    max_recovery_attempts: u32,
}

impl StateMachineDefinition {
    /// The loader guarantees `states` is non-empty and closed under transitions.
    pub(crate) fn from_validated(
        name: Option<String>,
        states: Vec<StateDefinition>,
        dependencies: Vec<String>,
        max_recovery_attempts: u32,
    ) -> Self {
        Self {
            name,
            states,
            dependencies,
            max_recovery_attempts,
        }
    }

    /// Optional identifier declared by the source.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// States in declaration order.
    pub fn states(&self) -> &[StateDefinition] {
        &self.states
    }

    pub fn state(&self, name: &str) -> Option<&StateDefinition> {
        self.states.iter().find(|state| state.name() == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.state(name).is_some()
    }

    pub fn state_names(&self) -> impl Iterator<Item = &str> {
        self.states.iter().map(StateDefinition::name)
    }

    /// Name of the first declared state.
    pub fn initial_state(&self) -> &str {
        // non-empty, enforced by the loader
        self.states[0].name()
    }

    /// Target of `label` when leaving `state`.
    pub fn transition(&self, state: &str, label: &TransitionLabel) -> Option<&str> {
        self.state(state).and_then(|definition| definition.target(label))
    }

    pub fn dependencies(&self) -> &[String] {
        &self.dependencies
    }

    pub fn max_recovery_attempts(&self) -> u32 {
        self.max_recovery_attempts
    }
}
