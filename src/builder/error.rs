//! Errors raised while constructing an engine.

use thiserror::Error;

/// Errors that can occur when building an [`Ftsm`](crate::engine::Ftsm).
#[derive(Debug, Error)]
pub enum ConfigurationError {
    #[error("State machine definition not specified. Call .definition(definition) before .build()")]
    MissingDefinition,

    #[error("State handlers not specified. Call .handlers(handlers) before .build()")]
    MissingHandlers,

    #[error("No handler for declared state '{state}'")]
    UnhandledState { state: String },

    #[error("Dependency '{dependency}' could not be resolved")]
    UnresolvedDependency { dependency: String },
}
