//! Mutable per-execution fields of an action.

/// Fields an action machine keeps between ticks.
///
/// `execution_requested` and `preempted` only change through
/// [`ActionMessage`](super::ActionMessage)s drained by the machine;
/// `goal` and `result` are owned by the action.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ActionRuntime<G, R> {
    pub(crate) execution_requested: bool,
    pub(crate) preempted: bool,
    pub(crate) goal: Option<G>,
    pub(crate) result: Option<R>,
}

impl<G, R> Default for ActionRuntime<G, R> {
    fn default() -> Self {
        Self {
            execution_requested: false,
            preempted: false,
            goal: None,
            result: None,
        }
    }
}

impl<G, R> ActionRuntime<G, R> {
    pub fn execution_requested(&self) -> bool {
        self.execution_requested
    }

    pub fn is_preempted(&self) -> bool {
        self.preempted
    }

    pub fn goal(&self) -> Option<&G> {
        self.goal.as_ref()
    }

    pub fn result(&self) -> Option<&R> {
        self.result.as_ref()
    }

    /// Record the outcome of the current execution.
    pub fn set_result(&mut self, result: R) {
        self.result = Some(result);
    }
}
