//! Removal of redundant same-species chains.
//!
//! Parton showers write long straight runs of one species radiating into
//! itself, e.g.:
//!
//! ```text
//! ->-g->-g->-g->-
//! ```
//!
//! Those interior steps matter for generator internals but only clutter a
//! diagram. A particle is chain-interior when it has exactly one parent and
//! exactly one child and its PDG code equals both of theirs; branch points
//! (more than one parent or child) are never eligible, so chain heads and
//! tails survive.
//!
//! Removal strictly shrinks the graph, so looping to a fixpoint terminates
//! in at most one pass per removed particle.

use crate::eg::EventGraph;
use evplot_event::Representation;
use tracing::debug;

/// Collapse redundant chains in either representation, in place.
pub fn remove_redundants(graph: &mut EventGraph) {
    match graph.representation() {
        Representation::Node => remove_redundant_nodes(graph),
        Representation::Edge => remove_redundant_edges(graph),
    }
}

/// NODE representation: drop a chain-interior particle node and wire its
/// parent straight to its child.
fn remove_redundant_nodes(graph: &mut EventGraph) {
    loop {
        let mut removal = None;
        for node in graph.iter_nodes() {
            let Some(particle) = node.particle.as_ref() else {
                continue;
            };
            let parents = graph.predecessors(node.barcode);
            let children = graph.successors(node.barcode);
            if parents.len() != 1 || children.len() != 1 {
                continue;
            }
            if graph.pdgid_of_node(parents[0]) == Some(particle.pdgid)
                && graph.pdgid_of_node(children[0]) == Some(particle.pdgid)
            {
                removal = Some((node.barcode, parents[0], children[0]));
                break;
            }
        }
        let Some((barcode, parent, child)) = removal else {
            break;
        };
        debug!("removing redundant node {barcode}");
        graph.remove_node(barcode);
        graph.add_edge(parent, child, None);
    }
}

/// EDGE representation: drop a chain-interior particle edge and merge its
/// two vertices, so the parent edge feeds the child edge directly.
fn remove_redundant_edges(graph: &mut EventGraph) {
    loop {
        let mut removal = None;
        for (idx, edge) in graph.iter_edges().enumerate() {
            let Some(particle) = edge.particle.as_ref() else {
                continue;
            };
            let (out_vtx, in_vtx) = (edge.out_barcode, edge.in_barcode);
            // Chain-interior: lone arrival at and departure from the
            // production vertex, same at the decay vertex, and both
            // neighbours the same species.
            if graph.in_degree(out_vtx) != 1
                || graph.out_degree(out_vtx) != 1
                || graph.in_degree(in_vtx) != 1
                || graph.out_degree(in_vtx) != 1
            {
                continue;
            }
            let parent_pdg = graph
                .iter_edges()
                .find(|e| e.in_barcode == out_vtx)
                .and_then(|e| e.particle.as_ref())
                .map(|p| p.pdgid);
            let child_pdg = graph
                .iter_edges()
                .find(|e| e.out_barcode == in_vtx)
                .and_then(|e| e.particle.as_ref())
                .map(|p| p.pdgid);
            if parent_pdg == Some(particle.pdgid) && child_pdg == Some(particle.pdgid) {
                removal = Some((idx, out_vtx, in_vtx));
                break;
            }
        }
        let Some((idx, out_vtx, in_vtx)) = removal else {
            break;
        };
        debug!("removing redundant edge between vertices {out_vtx} and {in_vtx}");
        graph.remove_edge_merging_vertices(idx, out_vtx, in_vtx);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::eg::{assign_particles_edges, assign_particles_nodes};
    use evplot_event::{EdgeParticle, NodeParticle, Particle};

    fn np(barcode: i64, pdgid: i64, parents: &[i64]) -> NodeParticle {
        NodeParticle::new(Particle::new(barcode, pdgid, 1), parents.to_vec())
    }

    fn ep(barcode: i64, pdgid: i64, vtx_out: i64, vtx_in: i64) -> EdgeParticle {
        EdgeParticle {
            particle: Particle::new(barcode, pdgid, 1),
            vtx_out_barcode: vtx_out,
            vtx_in_barcode: vtx_in,
        }
    }

    #[test]
    fn test_gluon_chain_collapses_to_single_edge() {
        // 195:g -> 278:g -> 323:g -> 394:g
        let records = vec![
            np(195, 21, &[]),
            np(278, 21, &[195]),
            np(323, 21, &[278]),
            np(394, 21, &[323]),
        ];
        let mut graph = assign_particles_nodes(&records).unwrap();
        remove_redundants(&mut graph);

        let barcodes: Vec<i64> = graph.iter_nodes().map(|n| n.barcode).collect();
        assert_eq!(barcodes, vec![195, 394]);
        assert_eq!(graph.edge_count(), 1);
        let edge = graph.iter_edges().next().unwrap();
        assert_eq!((edge.out_barcode, edge.in_barcode), (195, 394));
    }

    #[test]
    fn test_branch_points_are_preserved() {
        // 1:g -> 2:g -> {3:g, 4:g}; 2 branches so nothing may be removed.
        let records = vec![
            np(1, 21, &[]),
            np(2, 21, &[1]),
            np(3, 21, &[2]),
            np(4, 21, &[2]),
        ];
        let mut graph = assign_particles_nodes(&records).unwrap();
        remove_redundants(&mut graph);
        assert_eq!(graph.node_count(), 4);
        assert_eq!(graph.edge_count(), 3);
    }

    #[test]
    fn test_flavour_change_breaks_the_chain() {
        // 1:u -> 2:g -> 3:g -> 4:u. Neither gluon touches two gluons, so
        // both survive: only chain-interior particles go.
        let records = vec![
            np(1, 2, &[]),
            np(2, 21, &[1]),
            np(3, 21, &[2]),
            np(4, 2, &[3]),
        ];
        let mut graph = assign_particles_nodes(&records).unwrap();
        remove_redundants(&mut graph);
        assert_eq!(graph.node_count(), 4);
    }

    #[test]
    fn test_simplification_is_idempotent() {
        let records = vec![
            np(1, 21, &[]),
            np(2, 21, &[1]),
            np(3, 21, &[2]),
            np(4, 21, &[3]),
            np(5, 5, &[4]),
            np(6, -5, &[4]),
        ];
        let mut once = assign_particles_nodes(&records).unwrap();
        remove_redundants(&mut once);
        let mut twice = once.clone();
        remove_redundants(&mut twice);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_edge_representation_chain() {
        // Vertices -1 -> -2 -> -3 -> -4 carrying g, g, g: the middle gluon
        // is chain-interior and goes; head and tail survive.
        let records = vec![ep(1, 21, -1, -2), ep(2, 21, -2, -3), ep(3, 21, -3, -4)];
        let mut graph = assign_particles_edges(&records).unwrap();
        remove_redundants(&mut graph);
        assert_eq!(graph.edge_count(), 2);
        let barcodes: Vec<i64> = graph.iter_particles().map(|p| p.barcode).collect();
        assert_eq!(barcodes, vec![1, 3]);
        // The survivors share a vertex.
        let edges: Vec<_> = graph.iter_edges().collect();
        assert_eq!(edges[0].in_barcode, edges[1].out_barcode);
    }

    #[test]
    fn test_edge_representation_keeps_branching_decay() {
        // u ubar -> g -> g -> g -> u ubar, as in a 2-to-2 shower: only the
        // middle gluon is chain-interior; the first follows the two-parton
        // fusion and the last feeds the u ubar pair, so both stay.
        let records = vec![
            ep(1, 2, -1, -3),
            ep(2, -2, -2, -3),
            ep(3, 21, -3, -4),
            ep(4, 21, -4, -5),
            ep(5, 21, -5, -6),
            ep(6, 2, -6, -7),
            ep(7, -2, -6, -8),
        ];
        let mut graph = assign_particles_edges(&records).unwrap();
        remove_redundants(&mut graph);
        let barcodes: Vec<i64> = graph.iter_particles().map(|p| p.barcode).collect();
        assert_eq!(barcodes, vec![1, 2, 3, 5, 6, 7]);
    }
}
