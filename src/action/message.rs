//! Messages external callers send to an action state machine.

use std::sync::mpsc::Sender;
use thiserror::Error;

/// A request delivered to an [`ActionStateMachine`](super::ActionStateMachine).
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ActionMessage<G> {
    /// Arm a new execution cycle, optionally with a goal.
    RequestExecution(Option<G>),
    /// Ask the current execution to stop at the next state boundary.
    Preempt,
}

#[derive(Debug, Error)]
pub enum HandleError {
    #[error("action state machine is no longer receiving messages")]
    Disconnected,
}

/// Cloneable, thread-safe sender for [`ActionMessage`]s.
///
/// The machine drains its inbox at every state boundary, so each message is
/// observed exactly once no matter which thread sent it.
#[derive(Debug)]
pub struct ActionHandle<G> {
    sender: Sender<ActionMessage<G>>,
}

impl<G> Clone for ActionHandle<G> {
    fn clone(&self) -> Self {
        Self {
            sender: self.sender.clone(),
        }
    }
}

impl<G> ActionHandle<G> {
    pub(crate) fn new(sender: Sender<ActionMessage<G>>) -> Self {
        Self { sender }
    }

    /// Request an execution towards `goal`.
    pub fn request_execution(&self, goal: G) -> Result<(), HandleError> {
        self.send(ActionMessage::RequestExecution(Some(goal)))
    }

    /// Request an execution without a goal.
    pub fn request(&self) -> Result<(), HandleError> {
        self.send(ActionMessage::RequestExecution(None))
    }

    pub fn preempt(&self) -> Result<(), HandleError> {
        self.send(ActionMessage::Preempt)
    }

    pub fn send(&self, message: ActionMessage<G>) -> Result<(), HandleError> {
        self.sender
            .send(message)
            .map_err(|_| HandleError::Disconnected)
    }
}
