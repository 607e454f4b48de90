//! FTSM: a declarative, fault-tolerant state machine runtime
//!
//! FTSM drives the lifecycle of a long-running action through a state graph
//! supplied as configuration. The graph is loaded and validated once, then
//! an engine ticks through it, routing recoverable failures through a
//! bounded recovery state.
//!
//! # Core Concepts
//!
//! - **Definition**: an immutable, validated state graph ([`loader`], [`core`])
//! - **Engine**: executes one state handler per tick ([`engine`], [`builder`])
//! - **Action**: the standard init/configure/ready/run/recover lifecycle ([`action`])
//!
//! # Example
//!
//! ```rust
//! use ftsm::action::{Action, ActionRuntime, ActionStateMachine};
//! use ftsm::builder::FtsmBuilder;
//! use ftsm::loader::DefinitionLoader;
//!
//! struct Wave;
//!
//! impl Action for Wave {
//!     type Goal = ();
//!     type Output = bool;
//!
//!     fn set_result(&mut self, runtime: &mut ActionRuntime<(), bool>, success: bool) {
//!         runtime.set_result(success);
//!     }
//! }
//!
//! let definition = DefinitionLoader::load_str(
//!     r#"
//! states:
//!   init: { transitions: { initialised: configuring } }
//!   configuring: { transitions: { done_configuring: ready } }
//!   ready: { transitions: { run: running, wait: ready } }
//!   running: { transitions: { done: ready } }
//!   recovering: { transitions: { done_recovering: ready } }
//! "#,
//! )
//! .unwrap();
//!
//! let mut engine = FtsmBuilder::new("wave")
//!     .definition(definition)
//!     .handlers(ActionStateMachine::new(Wave))
//!     .build()
//!     .unwrap();
//!
//! engine.run_until(|state| state == "ready").unwrap();
//! engine.handlers().handle().request().unwrap();
//! engine.run_until(|state| state == "running").unwrap();
//! ```

pub mod action;
pub mod builder;
pub mod core;
pub mod engine;
pub mod graph;
pub mod loader;
pub mod snapshot;

// Re-export commonly used types
pub use action::{Action, ActionHandle, ActionStateMachine};
pub use builder::{ConfigurationError, FtsmBuilder};
pub use crate::core::{StateDefinition, StateMachineDefinition, TransitionLabel};
pub use engine::{Ftsm, FtsmError, StateHandlers, StateOutcome, StepResult};
pub use loader::{DefinitionError, DefinitionLoader};
