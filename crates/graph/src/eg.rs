//! The event graph and its builders.
//!
//! An [`EventGraph`] is a directed multigraph over one event. In the NODE
//! representation, graph nodes carry particles and an edge (p -> c) means p
//! is a direct parent of c. In the EDGE representation, nodes are bare
//! interaction vertices and each particle rides on the edge from its
//! production vertex to its decay vertex.

use evplot_event::{EdgeParticle, NodeParticle, Particle, Representation};
use std::collections::{BTreeMap, HashMap, VecDeque};
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GraphError {
    #[error("particle {barcode} declares parent {parent}, but no record with that barcode exists")]
    ReferentialIntegrity { barcode: i64, parent: i64 },

    #[error("event graph contains a cycle through barcode {barcode}")]
    CycleDetected { barcode: i64 },
}

/// A graph node: a particle in NODE representation, a bare interaction
/// vertex in EDGE representation.
#[derive(Debug, Clone, PartialEq)]
pub struct GraphNode {
    pub barcode: i64,
    pub particle: Option<Particle>,
    pub highlight: bool,
}

/// A graph edge: a parent-child link in NODE representation, a particle in
/// EDGE representation.
#[derive(Debug, Clone, PartialEq)]
pub struct GraphEdge {
    pub out_barcode: i64,
    pub in_barcode: i64,
    pub particle: Option<Particle>,
    pub highlight: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EventGraph {
    representation: Representation,
    // BTreeMap keeps node iteration in barcode order, so exports are
    // deterministic run to run.
    nodes: BTreeMap<i64, GraphNode>,
    edges: Vec<GraphEdge>,
}

impl EventGraph {
    pub fn new(representation: Representation) -> Self {
        EventGraph {
            representation,
            nodes: BTreeMap::new(),
            edges: Vec::new(),
        }
    }

    pub fn representation(&self) -> Representation {
        self.representation
    }

    pub(crate) fn add_node(&mut self, barcode: i64, particle: Option<Particle>) {
        self.nodes.entry(barcode).or_insert(GraphNode {
            barcode,
            particle,
            highlight: false,
        });
    }

    pub(crate) fn add_edge(&mut self, out_barcode: i64, in_barcode: i64, particle: Option<Particle>) {
        self.edges.push(GraphEdge {
            out_barcode,
            in_barcode,
            particle,
            highlight: false,
        });
    }

    /// Remove a node together with every edge touching it.
    pub(crate) fn remove_node(&mut self, barcode: i64) {
        self.nodes.remove(&barcode);
        self.edges
            .retain(|e| e.out_barcode != barcode && e.in_barcode != barcode);
    }

    /// Remove the edge at `idx` and merge its decay vertex into its
    /// production vertex, re-pointing every other edge that touched the
    /// decay vertex. Used by the EDGE-representation chain simplifier.
    pub(crate) fn remove_edge_merging_vertices(&mut self, idx: usize, out_vtx: i64, in_vtx: i64) {
        self.edges.remove(idx);
        for edge in &mut self.edges {
            if edge.out_barcode == in_vtx {
                edge.out_barcode = out_vtx;
            }
            if edge.in_barcode == in_vtx {
                edge.in_barcode = out_vtx;
            }
        }
        self.nodes.remove(&in_vtx);
    }

    pub fn node(&self, barcode: i64) -> Option<&GraphNode> {
        self.nodes.get(&barcode)
    }

    pub fn iter_nodes(&self) -> impl Iterator<Item = &GraphNode> {
        self.nodes.values()
    }

    pub(crate) fn iter_nodes_mut(&mut self) -> impl Iterator<Item = &mut GraphNode> {
        self.nodes.values_mut()
    }

    pub fn iter_edges(&self) -> impl Iterator<Item = &GraphEdge> {
        self.edges.iter()
    }

    pub(crate) fn iter_edges_mut(&mut self) -> impl Iterator<Item = &mut GraphEdge> {
        self.edges.iter_mut()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Barcodes reachable along one outgoing edge, one entry per edge.
    pub fn successors(&self, barcode: i64) -> Vec<i64> {
        self.edges
            .iter()
            .filter(|e| e.out_barcode == barcode)
            .map(|e| e.in_barcode)
            .collect()
    }

    /// Barcodes reaching this one along one incoming edge, one entry per edge.
    pub fn predecessors(&self, barcode: i64) -> Vec<i64> {
        self.edges
            .iter()
            .filter(|e| e.in_barcode == barcode)
            .map(|e| e.out_barcode)
            .collect()
    }

    pub fn in_degree(&self, barcode: i64) -> usize {
        self.edges.iter().filter(|e| e.in_barcode == barcode).count()
    }

    pub fn out_degree(&self, barcode: i64) -> usize {
        self.edges.iter().filter(|e| e.out_barcode == barcode).count()
    }

    /// Every particle stored in the graph, wherever the representation put it.
    pub fn iter_particles(&self) -> Box<dyn Iterator<Item = &Particle> + '_> {
        match self.representation {
            Representation::Node => {
                Box::new(self.nodes.values().filter_map(|n| n.particle.as_ref()))
            }
            Representation::Edge => {
                Box::new(self.edges.iter().filter_map(|e| e.particle.as_ref()))
            }
        }
    }

    pub(crate) fn pdgid_of_node(&self, barcode: i64) -> Option<i64> {
        self.nodes
            .get(&barcode)
            .and_then(|n| n.particle.as_ref())
            .map(|p| p.pdgid)
    }

    /// Kahn's algorithm; physical decay trees are acyclic, so any cycle means
    /// malformed input and the caller must not hand the graph to the
    /// simplifier.
    pub fn validate_acyclic(&self) -> Result<(), GraphError> {
        let mut in_degree: HashMap<i64, usize> =
            self.nodes.keys().map(|&b| (b, 0)).collect();
        for edge in &self.edges {
            *in_degree.entry(edge.in_barcode).or_insert(0) += 1;
        }
        let mut queue: VecDeque<i64> = in_degree
            .iter()
            .filter(|(_, &d)| d == 0)
            .map(|(&b, _)| b)
            .collect();
        let mut visited = 0usize;
        while let Some(barcode) = queue.pop_front() {
            visited += 1;
            for succ in self.successors(barcode) {
                let d = in_degree.get_mut(&succ).expect("edge to known node");
                *d -= 1;
                if *d == 0 {
                    queue.push_back(succ);
                }
            }
        }
        if visited == self.nodes.len() {
            Ok(())
        } else {
            let barcode = in_degree
                .iter()
                .filter(|(_, &d)| d > 0)
                .map(|(&b, _)| b)
                .min()
                .unwrap_or_default();
            Err(GraphError::CycleDetected { barcode })
        }
    }

    /// Drop nodes with no parents and no children. A NODE-mode event often
    /// grows these when the system pseudo-particle loses all its links.
    pub(crate) fn remove_isolated_nodes(&mut self) {
        let isolated: Vec<i64> = self
            .nodes
            .keys()
            .filter(|&&b| self.in_degree(b) == 0 && self.out_degree(b) == 0)
            .copied()
            .collect();
        for barcode in isolated {
            debug!("removing isolated node {barcode}");
            self.nodes.remove(&barcode);
        }
    }

    /// Initial state = no incoming edges, final state = no outgoing edges.
    /// This is the only place these flags are set.
    fn mark_initial_final(&mut self) {
        match self.representation {
            Representation::Node => {
                let barcodes: Vec<i64> = self.nodes.keys().copied().collect();
                for barcode in barcodes {
                    let initial = self.in_degree(barcode) == 0;
                    let is_final = self.out_degree(barcode) == 0;
                    if let Some(p) = self
                        .nodes
                        .get_mut(&barcode)
                        .and_then(|n| n.particle.as_mut())
                    {
                        p.initial_state = initial;
                        p.final_state = is_final;
                    }
                }
            }
            Representation::Edge => {
                let mut source_vtx = Vec::new();
                let mut sink_vtx = Vec::new();
                for &barcode in self.nodes.keys() {
                    if self.in_degree(barcode) == 0 {
                        source_vtx.push(barcode);
                    }
                    if self.out_degree(barcode) == 0 {
                        sink_vtx.push(barcode);
                    }
                }
                for edge in &mut self.edges {
                    if let Some(p) = edge.particle.as_mut() {
                        p.initial_state = source_vtx.contains(&edge.out_barcode);
                        p.final_state = sink_vtx.contains(&edge.in_barcode);
                    }
                }
            }
        }
    }
}

/// Build a NODE-representation graph: one node per particle, one edge per
/// declared parent link.
///
/// Every parent barcode must name a record in the input; a dangling
/// reference is malformed input and fails hard rather than silently growing
/// a phantom node.
pub fn assign_particles_nodes(node_particles: &[NodeParticle]) -> Result<EventGraph, GraphError> {
    let mut graph = EventGraph::new(Representation::Node);

    for np in node_particles {
        graph.add_node(np.barcode(), Some(np.particle.clone()));
    }

    for np in node_particles {
        for &parent in &np.parent_barcodes {
            if graph.node(parent).is_none() {
                return Err(GraphError::ReferentialIntegrity {
                    barcode: np.barcode(),
                    parent,
                });
            }
            graph.add_edge(parent, np.barcode(), None);
        }
    }

    graph.mark_initial_final();
    graph.remove_isolated_nodes();
    graph.validate_acyclic()?;
    debug!(
        nodes = graph.node_count(),
        edges = graph.edge_count(),
        "built node-representation graph"
    );
    Ok(graph)
}

/// Build an EDGE-representation graph: one bare node per interaction vertex,
/// one edge per particle from its production vertex to its decay vertex.
pub fn assign_particles_edges(edge_particles: &[EdgeParticle]) -> Result<EventGraph, GraphError> {
    let mut graph = EventGraph::new(Representation::Edge);

    for ep in edge_particles {
        graph.add_node(ep.vtx_out_barcode, None);
        graph.add_node(ep.vtx_in_barcode, None);
        graph.add_edge(ep.vtx_out_barcode, ep.vtx_in_barcode, Some(ep.particle.clone()));
        debug!(
            "add edge {} > {} for {}",
            ep.vtx_out_barcode, ep.vtx_in_barcode, ep.particle
        );
    }

    graph.mark_initial_final();
    graph.validate_acyclic()?;
    debug!(
        nodes = graph.node_count(),
        edges = graph.edge_count(),
        "built edge-representation graph"
    );
    Ok(graph)
}
