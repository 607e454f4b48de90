//! Core data model of the state machine runtime.
//!
//! This module contains the immutable description of a state graph:
//! - [`StateDefinition`] and [`StateMachineDefinition`], built by the loader
//! - [`TransitionLabel`], the tag a handler returns to pick an edge
//! - [`TransitionHistory`], the bounded record of followed edges
//!
//! Nothing here executes handlers; see [`crate::engine`] for that.

mod definition;
mod history;
mod state;
mod transition;

pub use definition::{StateMachineDefinition, DEFAULT_MAX_RECOVERY_ATTEMPTS};
pub use history::{TransitionHistory, TransitionRecord, DEFAULT_HISTORY_LIMIT};
pub use state::StateDefinition;
pub use transition::TransitionLabel;

/// Well-known lifecycle state names.
pub mod states {
    pub use super::state::{CONFIGURING, FAILED, INIT, READY, RECOVERING, RUNNING};
}
