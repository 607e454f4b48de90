//! Directed-graph view of a definition, for rendering.
//!
//! The graph is read-only: it never validates or mutates the definition it
//! was built from.

use crate::core::{StateMachineDefinition, TransitionLabel};

/// An edge of the state graph.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GraphEdge {
    pub from: String,
    pub label: TransitionLabel,
    pub to: String,
}

/// Nodes, edges, initial node and sinks of a definition.
///
/// # Example
///
/// ```rust
/// use ftsm::graph::StateGraph;
/// use ftsm::loader::DefinitionLoader;
///
/// let definition = DefinitionLoader::load_str(
///     "states:\n  ready:\n    transitions:\n      run: running\n  running: {}\n",
/// )
/// .unwrap();
/// let graph = StateGraph::from_definition(&definition);
///
/// assert_eq!(graph.initial(), "ready");
/// assert_eq!(graph.sinks(), &["running".to_string()]);
/// assert!(graph.to_dot().contains("\"ready\" -> \"running\" [label=\"run\"]"));
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StateGraph {
    nodes: Vec<String>,
    edges: Vec<GraphEdge>,
    initial: String,
    sinks: Vec<String>,
}

impl StateGraph {
    pub fn from_definition(definition: &StateMachineDefinition) -> Self {
        let nodes: Vec<String> = definition.state_names().map(str::to_string).collect();
        let edges = definition
            .states()
            .iter()
            .flat_map(|state| {
                state.transitions().iter().map(|(label, to)| GraphEdge {
                    from: state.name().to_string(),
                    label: label.clone(),
                    to: to.clone(),
                })
            })
            .collect();
        let sinks = definition
            .states()
            .iter()
            .filter(|state| state.is_sink())
            .map(|state| state.name().to_string())
            .collect();

        Self {
            nodes,
            edges,
            initial: definition.initial_state().to_string(),
            sinks,
        }
    }

    pub fn nodes(&self) -> &[String] {
        &self.nodes
    }

    pub fn edges(&self) -> &[GraphEdge] {
        &self.edges
    }

    pub fn initial(&self) -> &str {
        &self.initial
    }

    pub fn sinks(&self) -> &[String] {
        &self.sinks
    }

    /// Render as Graphviz DOT: initial node green, sinks red.
    pub fn to_dot(&self) -> String {
        let mut dot = String::from("digraph state_machine {\n");
        for node in &self.nodes {
            let color = if *node == self.initial {
                Some("green")
            } else if self.sinks.contains(node) {
                Some("red")
            } else {
                None
            };
            let line = match color {
                Some(color) => format!(
                    "    \"{}\" [style=filled, fillcolor={color}];\n",
                    escape(node)
                ),
                None => format!("    \"{}\";\n", escape(node)),
            };
            dot.push_str(&line);
        }
        for edge in &self.edges {
            dot.push_str(&format!(
                "    \"{}\" -> \"{}\" [label=\"{}\"];\n",
                escape(&edge.from),
                escape(&edge.to),
                escape(edge.label.as_str())
            ));
        }
        dot.push_str("}\n");
        dot
    }
}

fn escape(text: &str) -> String {
    text.replace('\\', "\\\\").replace('"', "\\\"")
}
