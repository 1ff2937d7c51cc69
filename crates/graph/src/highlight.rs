//! Tagging of user-requested particle species for distinct rendering.

use crate::eg::EventGraph;
use evplot_event::particle::strip_decorations;
use evplot_event::{Particle, Representation};
use std::collections::HashSet;
use tracing::debug;

/// A set of particle names to highlight.
///
/// Matching is exact on the decoration-stripped display name. It must never
/// fall back to substring matching: "b" marking "bbar" and "b*" is a bug
/// this tool has shipped once already.
#[derive(Debug, Clone, Default)]
pub struct Highlights {
    names: HashSet<String>,
}

impl Highlights {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Highlights {
            names: names
                .into_iter()
                .map(|n| strip_decorations(n.as_ref()).to_string())
                .collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn matches(&self, particle: &Particle) -> bool {
        self.names.contains(particle.stripped_name())
    }

    /// Set the highlight flag on every matching graph element. Returns how
    /// many were marked.
    pub fn apply(&self, graph: &mut EventGraph) -> usize {
        if self.is_empty() {
            return 0;
        }
        let mut marked = 0;
        match graph.representation() {
            Representation::Node => {
                for node in graph.iter_nodes_mut() {
                    if node.particle.as_ref().is_some_and(|p| self.matches(p)) {
                        node.highlight = true;
                        marked += 1;
                    }
                }
            }
            Representation::Edge => {
                for edge in graph.iter_edges_mut() {
                    if edge.particle.as_ref().is_some_and(|p| self.matches(p)) {
                        edge.highlight = true;
                        marked += 1;
                    }
                }
            }
        }
        debug!(marked, "applied highlights");
        marked
    }
}
