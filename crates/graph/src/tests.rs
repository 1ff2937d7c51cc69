use crate::chains::remove_redundants;
use crate::convert::{edge_to_node, node_to_edge};
use crate::eg::{assign_particles_nodes, EventGraph, GraphError};
use crate::eg_dot::{DotExportConfig, EgToDot};
use crate::highlight::Highlights;
use evplot_event::{NodeParticle, Particle, Representation};

fn np(barcode: i64, pdgid: i64, parents: &[i64]) -> NodeParticle {
    NodeParticle::new(Particle::new(barcode, pdgid, 1), parents.to_vec())
}

/// A small but representative shower: two beam protons radiating into a
/// gluon chain that ends in a b bbar pair, plus a photon off one beam.
fn shower_records() -> Vec<NodeParticle> {
    vec![
        np(1, 2212, &[]),
        np(2, 2212, &[]),
        np(3, 21, &[1, 2]),
        np(4, 21, &[3]),
        np(5, 21, &[4]),
        np(6, 5, &[5]),
        np(7, -5, &[5]),
        np(8, 22, &[1]),
    ]
}

fn build(records: &[NodeParticle]) -> EventGraph {
    assign_particles_nodes(records).unwrap()
}

#[test]
fn test_full_pipeline_node_representation() {
    let mut graph = build(&shower_records());
    assert_eq!(graph.node_count(), 8);

    remove_redundants(&mut graph);
    // Gluon 4 is chain-interior (g between g and g); 3 follows the beams and
    // 5 feeds the b bbar split, so they stay.
    assert!(graph.node(4).is_none());
    assert_eq!(graph.node_count(), 7);

    let marked = Highlights::new(["b", "bbar"]).apply(&mut graph);
    assert_eq!(marked, 2);

    let dot = graph.to_dot("Event", &DotExportConfig::default());
    assert!(dot.contains("\"6\" [label=\"6: b\""));
    assert!(dot.contains("fillcolor=\"gold\""));
    assert!(!dot.contains("\"4\""), "removed gluon must not be exported");
}

#[test]
fn test_full_pipeline_edge_representation() {
    let node_graph = build(&shower_records());
    let mut graph = node_to_edge(&node_graph).unwrap();
    assert_eq!(graph.representation(), Representation::Edge);
    assert_eq!(graph.edge_count(), 8);

    remove_redundants(&mut graph);
    let barcodes: Vec<i64> = graph.iter_particles().map(|p| p.barcode).collect();
    assert!(!barcodes.contains(&4), "chain-interior gluon must go");
    assert!(barcodes.contains(&3) && barcodes.contains(&5));

    let dot = graph.to_dot("Event", &DotExportConfig::default());
    assert!(dot.contains("shape=\"point\""), "vertices drawn as points");
    assert!(dot.contains("label=\"6: b\""), "particles labelled on edges");
}

#[test]
fn test_simplify_then_convert_matches_convert_then_simplify() {
    // The chain is defined by parentage, so both orders must agree on the
    // surviving particle set.
    let mut simplified_first = build(&shower_records());
    remove_redundants(&mut simplified_first);
    let converted_after = node_to_edge(&simplified_first).unwrap();

    let mut converted_first = node_to_edge(&build(&shower_records())).unwrap();
    remove_redundants(&mut converted_first);

    let mut a: Vec<i64> = converted_after.iter_particles().map(|p| p.barcode).collect();
    let mut b: Vec<i64> = converted_first.iter_particles().map(|p| p.barcode).collect();
    a.sort_unstable();
    b.sort_unstable();
    assert_eq!(a, b);
}

#[test]
fn test_round_trip_preserves_initial_and_final_sets() {
    let node_graph = build(&shower_records());
    let back = edge_to_node(&node_to_edge(&node_graph).unwrap()).unwrap();

    let states = |g: &EventGraph| {
        let initial: Vec<i64> = g
            .iter_particles()
            .filter(|p| p.initial_state)
            .map(|p| p.barcode)
            .collect();
        let final_state: Vec<i64> = g
            .iter_particles()
            .filter(|p| p.final_state)
            .map(|p| p.barcode)
            .collect();
        (initial, final_state)
    };
    assert_eq!(states(&node_graph), states(&back));
}

#[test]
fn test_lhe_style_event_source_and_sink_counts() {
    // Two incoming partons, four outgoing, no intermediate resonances.
    let records = vec![
        np(1, 2, &[]),
        np(2, -2, &[]),
        np(3, 21, &[1, 2]),
        np(4, 21, &[1, 2]),
        np(5, 1, &[1, 2]),
        np(6, -1, &[1, 2]),
    ];
    let graph = build(&records);
    let sources = graph
        .iter_nodes()
        .filter(|n| graph.in_degree(n.barcode) == 0)
        .count();
    let sinks = graph
        .iter_nodes()
        .filter(|n| graph.out_degree(n.barcode) == 0)
        .count();
    assert_eq!(sources, 2);
    assert_eq!(sinks, 4);
}

#[test]
fn test_rejects_dangling_reference_in_pipeline() {
    let mut records = shower_records();
    records.push(np(9, 21, &[42]));
    assert_eq!(
        assign_particles_nodes(&records).unwrap_err(),
        GraphError::ReferentialIntegrity {
            barcode: 9,
            parent: 42
        }
    );
}
