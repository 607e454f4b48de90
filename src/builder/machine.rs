//! Builder for constructing engines.

use crate::builder::error::ConfigurationError;
use crate::core::states::FAILED;
use crate::core::{StateMachineDefinition, DEFAULT_HISTORY_LIMIT};
use crate::engine::{Ftsm, StateHandlers};
use std::fmt;
use tracing::info;

type Resolver = Box<dyn Fn(&str) -> bool + Send + Sync>;

/// Builder for constructing an [`Ftsm`] with a fluent API.
///
/// # Example
///
/// ```rust
/// use ftsm::builder::FtsmBuilder;
/// use ftsm::core::TransitionLabel;
/// use ftsm::engine::HandlerMap;
/// use ftsm::loader::DefinitionLoader;
///
/// let definition = DefinitionLoader::load_str(
///     "dependencies: [arm]\nstates:\n  ready:\n    transitions:\n      wait: ready\n",
/// )
/// .unwrap();
///
/// let engine = FtsmBuilder::new("idle_action")
///     .definition(definition)
///     .handlers(HandlerMap::new().on("ready", || TransitionLabel::Wait.into()))
///     .resolver(|dependency| dependency == "arm")
///     .build()
///     .unwrap();
///
/// assert_eq!(engine.current_state(), "ready");
/// assert_eq!(engine.dependencies(), &["arm".to_string()]);
/// ```
pub struct FtsmBuilder<H> {
    name: String,
    definition: Option<StateMachineDefinition>,
    handlers: Option<H>,
    dependencies: Vec<String>,
    max_recovery_attempts: Option<u32>,
    resolver: Option<Resolver>,
    history_limit: usize,
}

impl<H: StateHandlers> FtsmBuilder<H> {
    /// Create a builder for an engine named `name`.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            definition: None,
            handlers: None,
            dependencies: Vec::new(),
            max_recovery_attempts: None,
            resolver: None,
            history_limit: DEFAULT_HISTORY_LIMIT,
        }
    }

    /// Set the validated definition to execute (required).
    pub fn definition(mut self, definition: StateMachineDefinition) -> Self {
        self.definition = Some(definition);
        self
    }

    /// Set the handler set (required).
    pub fn handlers(mut self, handlers: H) -> Self {
        self.handlers = Some(handlers);
        self
    }

    /// Require a dependency in addition to those the definition declares.
    pub fn dependency(mut self, dependency: impl Into<String>) -> Self {
        self.dependencies.push(dependency.into());
        self
    }

    /// Require several dependencies at once.
    pub fn dependencies<I, D>(mut self, dependencies: I) -> Self
    where
        I: IntoIterator<Item = D>,
        D: Into<String>,
    {
        self.dependencies
            .extend(dependencies.into_iter().map(Into::into));
        self
    }

    /// Override the definition's recovery ceiling.
    pub fn max_recovery_attempts(mut self, attempts: u32) -> Self {
        self.max_recovery_attempts = Some(attempts);
        self
    }

    /// Check each dependency with `resolver` at build time.
    ///
    /// Without a resolver dependencies are only recorded.
    pub fn resolver<F>(mut self, resolver: F) -> Self
    where
        F: Fn(&str) -> bool + Send + Sync + 'static,
    {
        self.resolver = Some(Box::new(resolver));
        self
    }

    /// Number of transitions kept in the engine's history.
    pub fn history_limit(mut self, limit: usize) -> Self {
        self.history_limit = limit;
        self
    }

    /// Build the engine.
    /// Returns an error if required fields are missing, a declared state has
    /// no handler, or a dependency does not resolve.
    pub fn build(self) -> Result<Ftsm<H>, ConfigurationError> {
        let definition = self.definition.ok_or(ConfigurationError::MissingDefinition)?;
        let handlers = self.handlers.ok_or(ConfigurationError::MissingHandlers)?;

        // the failed state is entered by the engine, never executed
        if let Some(state) = definition
            .state_names()
            .find(|state| *state != FAILED && !handlers.handles(state))
        {
            return Err(ConfigurationError::UnhandledState {
                state: state.to_string(),
            });
        }

        let mut dependencies = definition.dependencies().to_vec();
        for dependency in self.dependencies {
            if !dependencies.contains(&dependency) {
                dependencies.push(dependency);
            }
        }
        if let Some(resolver) = &self.resolver {
            if let Some(missing) = dependencies
                .iter()
                .find(|dependency| !resolver(dependency.as_str()))
            {
                return Err(ConfigurationError::UnresolvedDependency {
                    dependency: missing.clone(),
                });
            }
        }

        let max_recovery_attempts = self
            .max_recovery_attempts
            .unwrap_or_else(|| definition.max_recovery_attempts());

        info!(
            machine = %self.name,
            initial = definition.initial_state(),
            states = definition.states().len(),
            max_recovery_attempts,
            "constructed state machine"
        );

        Ok(Ftsm::new(
            self.name,
            definition,
            handlers,
            dependencies,
            max_recovery_attempts,
            self.history_limit,
        ))
    }
}

impl<H> fmt::Debug for FtsmBuilder<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FtsmBuilder")
            .field("name", &self.name)
            .field("has_definition", &self.definition.is_some())
            .field("has_handlers", &self.handlers.is_some())
            .field("dependencies", &self.dependencies)
            .field("max_recovery_attempts", &self.max_recovery_attempts)
            .field("history_limit", &self.history_limit)
            .finish()
    }
}
