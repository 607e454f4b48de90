//! The handler capability the engine dispatches to.

use crate::core::TransitionLabel;
use std::collections::HashMap;
use std::fmt;

/// What a state handler reports back to the engine.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StateOutcome {
    /// Follow the edge with this label.
    Transition(TransitionLabel),
    /// A recoverable failure; the engine routes to the recovering state.
    Failure(String),
}

impl StateOutcome {
    pub fn transition(label: impl Into<TransitionLabel>) -> Self {
        Self::Transition(label.into())
    }

    pub fn failure(reason: impl Into<String>) -> Self {
        Self::Failure(reason.into())
    }
}

impl From<TransitionLabel> for StateOutcome {
    fn from(label: TransitionLabel) -> Self {
        Self::Transition(label)
    }
}

/// A set of handlers keyed by state name.
///
/// The engine refuses to start unless `handles` is true for every state
/// its definition declares, so `execute` is only ever called with a state
/// the set claimed.
pub trait StateHandlers {
    fn handles(&self, state: &str) -> bool;

    fn execute(&mut self, state: &str) -> StateOutcome;
}

type Handler = Box<dyn FnMut() -> StateOutcome + Send>;

/// Handler set assembled from closures.
///
/// # Example
///
/// ```rust
/// use ftsm::core::TransitionLabel;
/// use ftsm::engine::{HandlerMap, StateHandlers, StateOutcome};
///
/// let mut handlers = HandlerMap::new()
///     .on("ready", || StateOutcome::from(TransitionLabel::Wait));
///
/// assert!(handlers.handles("ready"));
/// assert_eq!(handlers.execute("ready"), TransitionLabel::Wait.into());
/// ```
#[derive(Default)]
pub struct HandlerMap {
    handlers: HashMap<String, Handler>,
}

impl HandlerMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or replace) the handler for `state`.
    pub fn on<F>(mut self, state: impl Into<String>, handler: F) -> Self
    where
        F: FnMut() -> StateOutcome + Send + 'static,
    {
        self.handlers.insert(state.into(), Box::new(handler));
        self
    }
}

impl StateHandlers for HandlerMap {
    fn handles(&self, state: &str) -> bool {
        self.handlers.contains_key(state)
    }

    fn execute(&mut self, state: &str) -> StateOutcome {
        match self.handlers.get_mut(state) {
            Some(handler) => handler(),
            None => StateOutcome::failure(format!("no handler registered for state '{state}'")),
        }
    }
}

impl fmt::Debug for HandlerMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut states: Vec<_> = self.handlers.keys().collect();
        states.sort();
        f.debug_struct("HandlerMap").field("states", &states).finish()
    }
}
