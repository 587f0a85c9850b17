//! Structural tests for the tissue segmentation graph.
mod common;
use common::*;
use fmriflow::graph::analysis;
use fmriflow::prelude::*;

#[test]
fn test_tissue_channel_mapping() {
    assert_eq!(TissueClass::Csf.channel(), 0);
    assert_eq!(TissueClass::Gray.channel(), 1);
    assert_eq!(TissueClass::White.channel(), 2);

    let mut channels: Vec<usize> = TissueClass::ALL.iter().map(|t| t.channel()).collect();
    channels.sort();
    assert_eq!(channels, vec![0, 1, 2]);
}

#[test]
fn test_single_segmentation_node_fed_from_anatomical_input() {
    let graph = seg_graph();

    let segment_nodes: Vec<_> = graph
        .nodes()
        .iter()
        .filter(|n| n.interface == Interface::FastSegment)
        .collect();
    assert_eq!(segment_nodes.len(), 1);

    let segment = node(&graph, "segment");
    let incoming: Vec<_> = graph.edges_into(segment).collect();
    assert_eq!(incoming.len(), 1);
    let edge = incoming[0];
    assert_eq!(graph.node(edge.source.node).name, "inputspec");
    assert_eq!(edge.source.port, "brain");
    assert_eq!(edge.target.port, "in_files");
}

#[test]
fn test_each_tissue_branch_selects_its_own_channel() {
    let graph = seg_graph();
    let segment = node(&graph, "segment");

    for tissue in TissueClass::ALL {
        let branch_head = node(&graph, &format!("{}_t1_to_native", tissue.prefix()));
        let edge = graph
            .edge_into(branch_head, "in_file")
            .expect("branch head should consume the probability maps");
        assert_eq!(edge.source.node, segment);
        assert_eq!(edge.source.port, "probability_maps");
        assert_eq!(
            edge.transform,
            Some(EdgeTransform::SelectVolume(tissue.channel()))
        );
    }
}

#[test]
fn test_branch_shape_probability_map_to_final_mask_is_four_edges() {
    let graph = seg_graph();
    let segment = node(&graph, "segment");

    for tissue in TissueClass::ALL {
        let p = tissue.prefix();
        let mask = node(&graph, &format!("{}_mask", p));
        assert_eq!(
            analysis::path_length(&graph, segment, mask),
            Some(4),
            "{} branch should be 4 edges deep",
            p
        );

        // Exactly two registration nodes upstream: one linear, one nonlinear.
        let upstream = analysis::upstream(&graph, mask);
        let registrations: Vec<_> = upstream
            .iter()
            .map(|id| graph.node(*id))
            .filter(|n| {
                matches!(n.interface, Interface::Flirt | Interface::ApplyWarp)
            })
            .collect();
        assert_eq!(registrations.len(), 2, "{} branch registrations", p);

        // They converge at one overlap node, then threshold, then final mask.
        let overlap = node(&graph, &format!("overlap_{}_with_prior", p));
        let binarize = node(&graph, &format!("binarize_threshold_{}", p));
        assert_eq!(
            edges_between(&graph, &format!("{}_t1_to_native", p), &format!("overlap_{}_with_prior", p)),
            vec![("out_file".to_string(), "in_file".to_string())]
        );
        assert_eq!(
            edges_between(&graph, &format!("{}_mni_to_native", p), &format!("overlap_{}_with_prior", p)),
            vec![("out_file".to_string(), "operand_files".to_string())]
        );
        assert_eq!(graph.edge_into(binarize, "in_file").unwrap().source.node, overlap);
        assert_eq!(graph.edge_into(mask, "in_file").unwrap().source.node, binarize);
    }
}

#[test]
fn test_prior_registration_uses_nearest_neighbor() {
    let graph = seg_graph();
    for tissue in TissueClass::ALL {
        let warp = node(&graph, &format!("{}_mni_to_native", tissue.prefix()));
        assert_eq!(
            graph.node(warp).params.get("interp"),
            Some(&Value::Str("nn".to_string())),
            "{} prior registration must not smooth the labels",
            tissue.prefix()
        );
    }
}

#[test]
fn test_threshold_feeds_binarize_through_operator_string() {
    let graph = seg_graph();
    for tissue in TissueClass::ALL {
        let binarize = node(&graph, &format!("binarize_threshold_{}", tissue.prefix()));
        let edge = graph
            .edge_into(binarize, "op_string")
            .expect("threshold input should drive the operator string");
        assert_eq!(graph.node(edge.source.node).name, tissue.threshold_input());
        assert_eq!(edge.transform, Some(EdgeTransform::ThresholdBinarize));
    }
}

#[test]
fn test_final_mask_applies_the_global_mask() {
    let graph = seg_graph();
    for tissue in TissueClass::ALL {
        let mask = node(&graph, &format!("{}_mask", tissue.prefix()));
        let edge = graph.edge_into(mask, "operand_files").unwrap();
        assert_eq!(graph.node(edge.source.node).name, "inputspec");
        assert_eq!(edge.source.port, "preprocessed_mask");
    }
}

#[test]
fn test_every_output_port_is_wired() {
    let graph = seg_graph();
    let outputspec = node(&graph, "outputspec");
    let fields = graph.node(outputspec).interface.input_ports();
    // 3 tissues x 5 stages + global mask + 4 raw segmentation outputs.
    assert_eq!(fields.len(), 20);
    for field in fields {
        assert!(
            graph.edge_into(outputspec, field).is_some(),
            "output port '{}' has no producer",
            field
        );
    }
}

#[test]
fn test_builder_is_idempotent() {
    assert!(isomorphic(&seg_graph(), &seg_graph()));
}

#[test]
fn test_threshold_sweep_fans_out_downstream_masks() {
    let mut graph = seg_graph();
    let csf = node(&graph, "csf_threshold");
    graph
        .set_input(csf, "csf_threshold", Value::floats([0.4, 0.5]))
        .unwrap();
    let wm = node(&graph, "wm_threshold");
    graph
        .set_input(wm, "wm_threshold", Value::floats([0.66]))
        .unwrap();

    let counts = analysis::element_counts(&graph).unwrap();
    assert_eq!(counts["csf_mask.out_file"], 2);
    assert_eq!(counts["wm_mask.out_file"], 1);
    // Branches are independent: the gray matter branch is untouched.
    assert_eq!(counts["gm_mask.out_file"], 1);
    assert_eq!(counts["outputspec.csf_mask"], 2);
}

#[test]
fn test_graph_is_acyclic() {
    let graph = seg_graph();
    let order = analysis::topo_order(&graph).expect("seg graph must be a DAG");
    assert_eq!(order.len(), graph.nodes().len());
}
