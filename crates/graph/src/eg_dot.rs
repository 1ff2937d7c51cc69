//! DOT (Graphviz) export for event graphs.
//!
//! Converts an `EventGraph` into a DOT language string for layout with the
//! Graphviz tools. Includes default particle styling and allows
//! customization via closures.

use crate::eg::{EventGraph, GraphEdge, GraphNode};
use evplot_event::{Particle, Representation};
use std::fmt::Write;

/// Colors for the three styled particle classes.
#[derive(Debug, Clone, PartialEq)]
pub struct Palette {
    pub initial: String,
    pub final_state: String,
    pub highlight: String,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            initial: "green3".to_string(),
            final_state: "dodgerblue1".to_string(),
            highlight: "gold".to_string(),
        }
    }
}

/// Configuration options for DOT export.
#[derive(Debug, Clone, PartialEq)]
pub struct DotExportConfig {
    /// Graph-wide attributes, written as `key=value;` lines.
    pub graph_attrs: Vec<(String, String)>,
    /// Event title, rendered as an HTML-ish label above the graph.
    pub title: Option<String>,
    /// Pin all initial-state particles to the same rank so beams line up.
    pub rank_initial: bool,
    pub palette: Palette,
}

impl Default for DotExportConfig {
    fn default() -> Self {
        Self {
            graph_attrs: vec![
                ("rankdir".to_string(), "LR".to_string()),
                ("ranksep".to_string(), "0.6".to_string()),
                ("nodesep".to_string(), "0.6".to_string()),
            ],
            title: None,
            rank_initial: true,
            palette: Palette::default(),
        }
    }
}

pub trait ToDotLabel {
    fn to_dot_label(&self) -> String;
}

impl ToDotLabel for Particle {
    fn to_dot_label(&self) -> String {
        format!("{}: {}", self.barcode, self.name)
    }
}

pub trait EgToDot {
    /// Exports the graph to DOT format using the default particle styling.
    fn to_dot(&self, name: &str, config: &DotExportConfig) -> String;

    /// Exports the graph to DOT format with custom node and edge formatters.
    fn to_dot_with_formatters<NF, EF>(
        &self,
        name: &str,
        config: &DotExportConfig,
        node_formatter: NF,
        edge_formatter: EF,
    ) -> String
    where
        NF: Fn(&GraphNode) -> Vec<(String, String)>,
        EF: Fn(&GraphEdge) -> Vec<(String, String)>;
}

/// Style attributes for a particle, first matching class wins:
/// highlighted, then initial state, then final state, then plain.
fn particle_style(particle: &Particle, highlight: bool, palette: &Palette) -> Vec<(String, String)> {
    if highlight {
        vec![
            ("style".to_string(), "filled".to_string()),
            ("fillcolor".to_string(), palette.highlight.clone()),
        ]
    } else if particle.initial_state {
        vec![
            ("shape".to_string(), "circle".to_string()),
            ("style".to_string(), "filled".to_string()),
            ("fillcolor".to_string(), palette.initial.clone()),
        ]
    } else if particle.final_state {
        vec![
            ("shape".to_string(), "box".to_string()),
            ("style".to_string(), "filled".to_string()),
            ("fillcolor".to_string(), palette.final_state.clone()),
        ]
    } else {
        Vec::new()
    }
}

fn particle_edge_style(
    particle: &Particle,
    highlight: bool,
    palette: &Palette,
) -> Vec<(String, String)> {
    if highlight {
        vec![
            ("color".to_string(), palette.highlight.clone()),
            ("fontcolor".to_string(), palette.highlight.clone()),
            ("penwidth".to_string(), "4".to_string()),
        ]
    } else if particle.initial_state {
        vec![
            ("color".to_string(), palette.initial.clone()),
            ("fontcolor".to_string(), palette.initial.clone()),
            ("penwidth".to_string(), "5".to_string()),
        ]
    } else if particle.final_state {
        vec![
            ("color".to_string(), palette.final_state.clone()),
            ("fontcolor".to_string(), palette.final_state.clone()),
        ]
    } else {
        vec![("penwidth".to_string(), "2".to_string())]
    }
}

impl EgToDot for EventGraph {
    fn to_dot(&self, name: &str, config: &DotExportConfig) -> String {
        self.to_dot_with_formatters(
            name,
            config,
            |node| match node.particle.as_ref() {
                Some(particle) => {
                    let mut attrs = vec![(
                        "label".to_string(),
                        escape_dot_string(&particle.to_dot_label()),
                    )];
                    attrs.extend(particle_style(particle, node.highlight, &config.palette));
                    attrs
                }
                // Bare interaction vertex in the EDGE representation.
                None => vec![("shape".to_string(), "point".to_string())],
            },
            |edge| match edge.particle.as_ref() {
                Some(particle) => {
                    let mut attrs = vec![(
                        "label".to_string(),
                        escape_dot_string(&particle.to_dot_label()),
                    )];
                    attrs.extend(particle_edge_style(particle, edge.highlight, &config.palette));
                    attrs
                }
                None => vec![("penwidth".to_string(), "2".to_string())],
            },
        )
    }

    fn to_dot_with_formatters<NF, EF>(
        &self,
        name: &str,
        config: &DotExportConfig,
        node_formatter: NF,
        edge_formatter: EF,
    ) -> String
    where
        NF: Fn(&GraphNode) -> Vec<(String, String)>,
        EF: Fn(&GraphEdge) -> Vec<(String, String)>,
    {
        let mut dot_output = String::new();
        let _ = writeln!(dot_output, "digraph \"{}\" {{", escape_dot_string(name));

        for (key, value) in &config.graph_attrs {
            let _ = writeln!(dot_output, "    {key}={value};");
        }
        let _ = writeln!(dot_output, "    node [fontname=\"Arial\"];");
        let _ = writeln!(dot_output, "    edge [fontname=\"Arial\"];");

        if let Some(title) = &config.title {
            let _ = writeln!(dot_output, "    labelloc=top;");
            let _ = writeln!(dot_output, "    labeljust=left;");
            let _ = writeln!(
                dot_output,
                "    label=<<FONT POINT-SIZE=\"40\"><B>{}</B></FONT>>;",
                escape_dot_string(title)
            );
        }
        let _ = writeln!(dot_output);

        for node in self.iter_nodes() {
            let attrs_str = format_attrs(&node_formatter(node));
            let _ = writeln!(dot_output, "    \"{}\" [{}];", node.barcode, attrs_str);
        }
        let _ = writeln!(dot_output);

        for edge in self.iter_edges() {
            let attrs_str = format_attrs(&edge_formatter(edge));
            let _ = writeln!(
                dot_output,
                "    \"{}\" -> \"{}\" [{}];",
                edge.out_barcode, edge.in_barcode, attrs_str
            );
        }

        if config.rank_initial {
            let initial = initial_rank_barcodes(self);
            if !initial.is_empty() {
                let listed = initial
                    .iter()
                    .map(|b| format!("\"{b}\""))
                    .collect::<Vec<_>>()
                    .join(" ");
                let _ = writeln!(
                    dot_output,
                    "    {{rank=same; {listed}}}; // initial particles on same level"
                );
            }
        }

        let _ = writeln!(dot_output, "}}");
        dot_output
    }
}

/// Graph nodes that should share the initial-state rank: the particles
/// themselves in NODE representation, their source vertices in EDGE
/// representation.
fn initial_rank_barcodes(graph: &EventGraph) -> Vec<i64> {
    match graph.representation() {
        Representation::Node => graph
            .iter_nodes()
            .filter(|n| n.particle.as_ref().is_some_and(|p| p.initial_state))
            .map(|n| n.barcode)
            .collect(),
        Representation::Edge => {
            let mut barcodes: Vec<i64> = graph
                .iter_edges()
                .filter(|e| e.particle.as_ref().is_some_and(|p| p.initial_state))
                .map(|e| e.out_barcode)
                .collect();
            barcodes.sort_unstable();
            barcodes.dedup();
            barcodes
        }
    }
}

fn format_attrs(attrs: &[(String, String)]) -> String {
    attrs
        .iter()
        .map(|(k, v)| format!("{}=\"{}\"", k, v))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Escapes characters in a string to be valid within a DOT label or
/// attribute value.
pub fn escape_dot_string(s: &str) -> String {
    s.replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('\n', "\\n")
        .replace('\r', "")
        .replace('\t', "\\t")
}
