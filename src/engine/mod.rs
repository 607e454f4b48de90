//! Execution of validated state graphs.
//!
//! The engine owns a [`StateMachineDefinition`](crate::core::StateMachineDefinition)
//! and a [`StateHandlers`] implementation. Each tick runs one handler and
//! follows the edge named by the returned [`TransitionLabel`](crate::core::TransitionLabel).
//!
//! # Failure handling
//!
//! - A [`StateOutcome::Failure`] is recoverable: the engine enters the
//!   `recovering` state and counts the attempt in a [`RecoveryCounter`].
//! - Once the counter exceeds its ceiling the engine moves to the terminal
//!   `failed` state and [`Ftsm::tick`] returns [`FtsmError::RecoveryExhausted`].
//! - A label the current state does not declare is a handler bug and is
//!   always fatal.

mod error;
mod handler;
mod machine;
mod recovery;

pub use error::FtsmError;
pub use handler::{HandlerMap, StateHandlers, StateOutcome};
pub use machine::{Ftsm, StepResult};
pub use recovery::RecoveryCounter;
