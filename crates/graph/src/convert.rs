//! Conversion between the two graph representations.
//!
//! Each format has a natural representation (HepMC describes vertices, the
//! table formats describe parent lists), but either drawing mode must be
//! available for every format, so a built graph can be converted to the
//! other representation.

use crate::eg::{assign_particles_edges, assign_particles_nodes, EventGraph, GraphError};
use evplot_event::{EdgeParticle, NodeParticle, Representation};
use std::collections::BTreeMap;

/// Turn an EDGE-representation graph into a NODE-representation one.
///
/// Particle p is a parent of particle c exactly when p flows into the
/// vertex c leaves from.
pub fn edge_to_node(graph: &EventGraph) -> Result<EventGraph, GraphError> {
    assert_eq!(graph.representation(), Representation::Edge);

    let mut node_particles = Vec::new();
    for edge in graph.iter_edges() {
        let Some(particle) = edge.particle.as_ref() else {
            continue;
        };
        let parent_barcodes: Vec<i64> = graph
            .iter_edges()
            .filter(|parent| parent.in_barcode == edge.out_barcode)
            .filter_map(|parent| parent.particle.as_ref())
            .map(|p| p.barcode)
            .collect();
        node_particles.push(NodeParticle::new(particle.clone(), parent_barcodes));
    }
    assign_particles_nodes(&node_particles)
}

/// Turn a NODE-representation graph into an EDGE-representation one.
///
/// Children sharing the same parent set are produced at one vertex, and
/// that vertex is where their parents decay; vertices reached through a
/// common parent are merged, since a particle decays only once. Fresh
/// vertices get negative barcodes, the HepMC habit, so they cannot collide
/// with particle barcodes.
pub fn node_to_edge(graph: &EventGraph) -> Result<EventGraph, GraphError> {
    assert_eq!(graph.representation(), Representation::Node);

    // Group children by their (sorted, deduplicated) parent set.
    let mut groups: BTreeMap<Vec<i64>, Vec<i64>> = BTreeMap::new();
    for node in graph.iter_nodes() {
        let mut parents = graph.predecessors(node.barcode);
        parents.sort_unstable();
        parents.dedup();
        if !parents.is_empty() {
            groups.entry(parents).or_default().push(node.barcode);
        }
    }

    // One vertex per group, then merge vertices that share a parent.
    let mut merged: BTreeMap<i64, i64> = BTreeMap::new();
    let mut decay_vertex: BTreeMap<i64, i64> = BTreeMap::new();
    let mut production_vertex: BTreeMap<i64, i64> = BTreeMap::new();
    let mut next_vtx = -1i64;

    for (parents, children) in &groups {
        let mut vtx = next_vtx;
        next_vtx -= 1;
        for parent in parents {
            if let Some(&existing) = decay_vertex.get(parent) {
                let existing = resolve(&merged, existing);
                if existing != vtx {
                    merged.insert(vtx, existing);
                    vtx = existing;
                }
            }
        }
        for parent in parents {
            decay_vertex.insert(*parent, vtx);
        }
        for child in children {
            production_vertex.insert(*child, vtx);
        }
    }

    let mut edge_particles = Vec::new();
    for node in graph.iter_nodes() {
        let Some(particle) = node.particle.as_ref() else {
            continue;
        };
        let vtx_out = production_vertex
            .get(&node.barcode)
            .map(|&v| resolve(&merged, v))
            .unwrap_or_else(|| {
                let v = next_vtx;
                next_vtx -= 1;
                v
            });
        let vtx_in = decay_vertex
            .get(&node.barcode)
            .map(|&v| resolve(&merged, v))
            .unwrap_or_else(|| {
                let v = next_vtx;
                next_vtx -= 1;
                v
            });
        edge_particles.push(EdgeParticle {
            particle: particle.clone(),
            vtx_out_barcode: vtx_out,
            vtx_in_barcode: vtx_in,
        });
    }
    assign_particles_edges(&edge_particles)
}

fn resolve(merged: &BTreeMap<i64, i64>, mut vtx: i64) -> i64 {
    while let Some(&target) = merged.get(&vtx) {
        vtx = target;
    }
    vtx
}

#[cfg(test)]
mod tests {
    use super::*;
    use evplot_event::Particle;

    fn np(barcode: i64, pdgid: i64, parents: &[i64]) -> NodeParticle {
        NodeParticle::new(Particle::new(barcode, pdgid, 1), parents.to_vec())
    }

    #[test]
    fn test_node_to_edge_round_trip_preserves_relations() {
        // g g -> h0 -> b bbar
        let records = vec![
            np(1, 21, &[]),
            np(2, 21, &[]),
            np(3, 25, &[1, 2]),
            np(4, 5, &[3]),
            np(5, -5, &[3]),
        ];
        let node_graph = assign_particles_nodes(&records).unwrap();
        let edge_graph = node_to_edge(&node_graph).unwrap();

        assert_eq!(edge_graph.representation(), Representation::Edge);
        assert_eq!(edge_graph.edge_count(), 5);

        // Both gluons must decay at the same vertex, where the Higgs is made.
        let vtx_of = |barcode: i64| {
            edge_graph
                .iter_edges()
                .find(|e| e.particle.as_ref().map(|p| p.barcode) == Some(barcode))
                .map(|e| (e.out_barcode, e.in_barcode))
                .unwrap()
        };
        assert_eq!(vtx_of(1).1, vtx_of(2).1);
        assert_eq!(vtx_of(1).1, vtx_of(3).0);
        assert_eq!(vtx_of(3).1, vtx_of(4).0);
        assert_eq!(vtx_of(4).0, vtx_of(5).0);

        // And back again: the node graph regains the same parentage.
        let back = edge_to_node(&edge_graph).unwrap();
        assert_eq!(back.node_count(), 5);
        let mut h_parents = back.predecessors(3);
        h_parents.sort_unstable();
        assert_eq!(h_parents, vec![1, 2]);
        assert_eq!(back.predecessors(4), vec![3]);
    }

    #[test]
    fn test_edge_to_node_marks_states() {
        let records = vec![np(1, 21, &[]), np(2, 21, &[1]), np(3, 22, &[1])];
        let node_graph = assign_particles_nodes(&records).unwrap();
        let edge_graph = node_to_edge(&node_graph).unwrap();
        let back = edge_to_node(&edge_graph).unwrap();

        let g = back.node(1).unwrap().particle.as_ref().unwrap();
        assert!(g.initial_state);
        let gamma = back.node(3).unwrap().particle.as_ref().unwrap();
        assert!(gamma.final_state);
    }
}
