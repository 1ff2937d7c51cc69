//! Particle records produced by the format parsers.
//!
//! Note about convention for the EDGE representation:
//!
//! A particle's "out" vertex is the one from which it is outgoing, and its
//! "in" vertex is the one into which it is incoming.
//! e.g. a -->-- b : a is the "out" vertex, b is the "in" vertex.

use crate::pdg;

/// Which graph element stands for a particle in the event graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Representation {
    /// Particles are graph nodes; edges are parent-child relationships.
    Node,
    /// Particles are graph edges; nodes are interaction vertices.
    Edge,
}

impl std::fmt::Display for Representation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Representation::Node => write!(f, "node"),
            Representation::Edge => write!(f, "edge"),
        }
    }
}

/// Four-momentum plus mass, kept only for display. The graph layer never
/// reads these.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Kinematics {
    pub px: f64,
    pub py: f64,
    pub pz: f64,
    pub energy: f64,
    pub mass: f64,
}

/// One particle from one event.
///
/// `barcode` is unique within its event. `name` is the display name exactly
/// as the source format gave it, which may carry decoration such as the
/// parentheses Pythia8 puts around intermediate states; formats without a
/// name column get the PDG lookup instead.
///
/// `initial_state`/`final_state` start out false and are set exactly once,
/// by the graph builder, from the in/out degree of the built graph.
#[derive(Debug, Clone, PartialEq)]
pub struct Particle {
    pub barcode: i64,
    pub pdgid: i64,
    pub name: String,
    pub status: i64,
    pub kinematics: Option<Kinematics>,
    pub initial_state: bool,
    pub final_state: bool,
}

impl Particle {
    pub fn new(barcode: i64, pdgid: i64, status: i64) -> Self {
        Particle {
            barcode,
            pdgid,
            name: pdg::particle_name(pdgid),
            status,
            kinematics: None,
            initial_state: false,
            final_state: false,
        }
    }

    /// Display name with one enclosing pair of decoration characters removed.
    pub fn stripped_name(&self) -> &str {
        strip_decorations(&self.name)
    }
}

impl std::fmt::Display for Particle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.barcode, self.name)
    }
}

/// Remove one enclosing `()` or `[]` pair from a display name.
///
/// Pythia8 prints intermediate states as e.g. `(ubar)`; some listings use
/// square brackets. Only a full enclosing pair counts: `b*` or `K(892)+`
/// come back untouched.
pub fn strip_decorations(name: &str) -> &str {
    let trimmed = name.trim();
    for (open, close) in [('(', ')'), ('[', ']')] {
        if let Some(inner) = trimmed
            .strip_prefix(open)
            .and_then(|rest| rest.strip_suffix(close))
        {
            return inner;
        }
    }
    trimmed
}

/// A particle destined for the NODE representation: the particle plus the
/// barcodes of its direct parents.
///
/// Parsers translate each format's "no parent" sentinel (Pythia8 mother 0,
/// CMSSW mother -1, LHE mother 0) into an empty list here; sentinels must
/// never reach the graph builder.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeParticle {
    pub particle: Particle,
    pub parent_barcodes: Vec<i64>,
}

impl NodeParticle {
    pub fn new(particle: Particle, parent_barcodes: Vec<i64>) -> Self {
        NodeParticle {
            particle,
            parent_barcodes,
        }
    }

    pub fn barcode(&self) -> i64 {
        self.particle.barcode
    }
}

/// A particle destined for the EDGE representation: the particle plus the
/// barcodes of its production (`vtx_out`) and decay (`vtx_in`) vertices.
#[derive(Debug, Clone, PartialEq)]
pub struct EdgeParticle {
    pub particle: Particle,
    pub vtx_out_barcode: i64,
    pub vtx_in_barcode: i64,
}

impl EdgeParticle {
    pub fn barcode(&self) -> i64 {
        self.particle.barcode
    }
}

/// Event-level metadata carried through to the diagram title.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EventInfo {
    pub event_num: i64,
    pub label: Option<String>,
}
