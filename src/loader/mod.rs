//! Loading and validation of declarative state machine definitions.
//!
//! Definitions are YAML documents:
//!
//! ```yaml
//! name: pick_object
//! dependencies: [arm, gripper]
//! max_recovery_attempts: 1
//! states:
//!   init:
//!     transitions:
//!       initialised: configuring
//!   configuring:
//!     transitions:
//!       done_configuring: ready
//!   ready: {}
//! ```
//!
//! A definition may be layered on a parent: states the child redefines
//! replace the parent's wholesale, everything else is carried over.

mod error;

pub use error::DefinitionError;

use crate::core::{
    StateDefinition, StateMachineDefinition, TransitionLabel, DEFAULT_MAX_RECOVERY_ATTEMPTS,
};
use serde::Deserialize;
use serde_yaml::Value;
use std::collections::{BTreeMap, HashSet};
use std::path::Path;
use tracing::{debug, info};

/// Parses definition sources into validated [`StateMachineDefinition`]s.
///
/// The loader holds no state; loading the same source twice yields equal
/// definitions.
///
/// # Example
///
/// ```rust
/// use ftsm::loader::DefinitionLoader;
///
/// let definition = DefinitionLoader::load_str(
///     r#"
/// states:
///   ready:
///     transitions:
///       run: running
///   running:
///     transitions:
///       done: ready
/// "#,
/// )
/// .unwrap();
///
/// assert_eq!(definition.initial_state(), "ready");
/// assert_eq!(definition.max_recovery_attempts(), 1);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct DefinitionLoader;

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawDefinition {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    dependencies: Vec<String>,
    #[serde(default)]
    max_recovery_attempts: Option<u32>,
    #[serde(default)]
    states: serde_yaml::Mapping,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawState {
    #[serde(default)]
    transitions: BTreeMap<String, String>,
}

/// A parsed but not yet validated source, states in declaration order.
#[derive(Debug, Default)]
struct ParsedDefinition {
    name: Option<String>,
    dependencies: Vec<String>,
    max_recovery_attempts: Option<u32>,
    states: Vec<(String, BTreeMap<String, String>)>,
}

impl DefinitionLoader {
    /// Load and validate the definition at `path`.
    pub fn load(path: impl AsRef<Path>) -> Result<StateMachineDefinition, DefinitionError> {
        let path = path.as_ref();
        let definition = Self::finish(read(path)?)?;
        info!(
            path = %path.display(),
            states = definition.states().len(),
            "loaded state machine definition"
        );
        Ok(definition)
    }

    /// Load the definition at `path` layered on top of the one at `parent_path`.
    pub fn load_with_parent(
        path: impl AsRef<Path>,
        parent_path: impl AsRef<Path>,
    ) -> Result<StateMachineDefinition, DefinitionError> {
        let (path, parent_path) = (path.as_ref(), parent_path.as_ref());
        let parent = read(parent_path)?;
        let child = read(path)?;
        let definition = Self::finish(merge(parent, child))?;
        info!(
            path = %path.display(),
            parent = %parent_path.display(),
            states = definition.states().len(),
            "loaded layered state machine definition"
        );
        Ok(definition)
    }

    /// Load and validate a definition held in memory.
    pub fn load_str(source: &str) -> Result<StateMachineDefinition, DefinitionError> {
        Self::finish(parse(source)?)
    }

    /// Layer an in-memory child source on an in-memory parent source.
    pub fn load_str_with_parent(
        source: &str,
        parent: &str,
    ) -> Result<StateMachineDefinition, DefinitionError> {
        let parent = parse(parent)?;
        let child = parse(source)?;
        Self::finish(merge(parent, child))
    }

    fn finish(parsed: ParsedDefinition) -> Result<StateMachineDefinition, DefinitionError> {
        validate(&parsed)?;

        let states = parsed
            .states
            .into_iter()
            .map(|(name, transitions)| {
                StateDefinition::new(
                    name,
                    transitions
                        .into_iter()
                        .map(|(label, target)| (TransitionLabel::from(label), target)),
                )
            })
            .collect();

        Ok(StateMachineDefinition::from_validated(
            parsed.name,
            states,
            parsed.dependencies,
            parsed
                .max_recovery_attempts
                .unwrap_or(DEFAULT_MAX_RECOVERY_ATTEMPTS),
        ))
    }
}

fn read(path: &Path) -> Result<ParsedDefinition, DefinitionError> {
    let source = std::fs::read_to_string(path).map_err(|source| DefinitionError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse(&source)
}

fn parse(source: &str) -> Result<ParsedDefinition, DefinitionError> {
    let raw = match serde_yaml::from_str::<Value>(source)? {
        Value::Null => RawDefinition::default(),
        document => serde_yaml::from_value::<RawDefinition>(document)?,
    };

    let mut states = Vec::with_capacity(raw.states.len());
    for (key, body) in raw.states {
        let Some(name) = key.as_str() else {
            return Err(DefinitionError::InvalidStateName(format!("{key:?}")));
        };
        let state = match body {
            Value::Null => RawState::default(),
            body => serde_yaml::from_value::<RawState>(body)?,
        };
        states.push((name.to_string(), state.transitions));
    }

    Ok(ParsedDefinition {
        name: raw.name,
        dependencies: raw.dependencies,
        max_recovery_attempts: raw.max_recovery_attempts,
        states,
    })
}

/// Layer `child` on `parent`. Redefined states are replaced wholesale and keep
/// the parent's position; states only the child declares are appended.
fn merge(parent: ParsedDefinition, child: ParsedDefinition) -> ParsedDefinition {
    let mut child_states: BTreeMap<String, BTreeMap<String, String>> = BTreeMap::new();
    let mut child_order = Vec::with_capacity(child.states.len());
    for (name, transitions) in child.states {
        child_order.push(name.clone());
        child_states.insert(name, transitions);
    }

    let mut states = Vec::with_capacity(parent.states.len() + child_order.len());
    for (name, transitions) in parent.states {
        match child_states.remove(&name) {
            Some(replacement) => {
                debug!(state = %name, "child definition replaces parent state");
                states.push((name, replacement));
            }
            None => states.push((name, transitions)),
        }
    }
    for name in child_order {
        if let Some(transitions) = child_states.remove(&name) {
            states.push((name, transitions));
        }
    }

    let mut dependencies = parent.dependencies;
    for dependency in child.dependencies {
        if !dependencies.contains(&dependency) {
            dependencies.push(dependency);
        }
    }

    ParsedDefinition {
        name: child.name.or(parent.name),
        dependencies,
        max_recovery_attempts: child
            .max_recovery_attempts
            .or(parent.max_recovery_attempts),
        states,
    }
}

fn validate(parsed: &ParsedDefinition) -> Result<(), DefinitionError> {
    if parsed.states.is_empty() {
        return Err(DefinitionError::Empty);
    }

    let declared: HashSet<&str> = parsed.states.iter().map(|(name, _)| name.as_str()).collect();
    let labels: HashSet<&str> = parsed
        .states
        .iter()
        .flat_map(|(_, transitions)| transitions.keys().map(String::as_str))
        .collect();

    for (state, transitions) in &parsed.states {
        for (label, target) in transitions {
            if declared.contains(target.as_str()) {
                continue;
            }
            let (state, label, target) = (state.clone(), label.clone(), target.clone());
            return Err(if labels.contains(target.as_str()) {
                DefinitionError::InvalidTransition {
                    state,
                    label,
                    target,
                }
            } else {
                DefinitionError::UndeclaredState {
                    state,
                    label,
                    target,
                }
            });
        }
    }

    Ok(())
}
