//! The standard action lifecycle as a handler set.
//!
//! [`ActionStateMachine`] implements the handlers for `init`,
//! `configuring`, `ready`, `running` and `recovering`, delegating the
//! action-specific work to an [`Action`]. External code talks to it only
//! through an [`ActionHandle`].

mod machine;
mod message;
mod runtime;

pub use machine::{Action, ActionStateMachine};
pub use message::{ActionHandle, ActionMessage, HandleError};
pub use runtime::ActionRuntime;
