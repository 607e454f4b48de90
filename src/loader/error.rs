//! Definition loading errors.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while loading or validating a state machine definition.
///
/// Any of these aborts loading entirely; no partially valid definition is
/// ever returned.
#[derive(Debug, Error)]
pub enum DefinitionError {
    #[error("cannot read state machine definition '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed state machine definition: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("state names must be strings, found {0}")]
    InvalidStateName(String),

    #[error("state machine definition declares no states")]
    Empty,

    #[error("undeclared state '{target}' referenced by transition '{label}' of state '{state}'")]
    UndeclaredState {
        state: String,
        label: String,
        target: String,
    },

    #[error("invalid transition '{label}' of state '{state}': '{target}' is a transition label, not a declared state")]
    InvalidTransition {
        state: String,
        label: String,
        target: String,
    },
}

impl DefinitionError {
    /// Whether this error comes from the referential-integrity pass rather
    /// than from reading or parsing the source.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::UndeclaredState { .. } | Self::InvalidTransition { .. }
        )
    }
}
