//! Common test utilities for building and probing pipeline graphs.
use fmriflow::prelude::*;

/// Builds the segmentation graph, panicking on wiring errors.
#[allow(dead_code)]
pub fn seg_graph() -> Graph {
    create_seg_preproc().expect("seg_preproc should wire cleanly")
}

/// Builds the seed correlation graph for the given extraction space.
#[allow(dead_code)]
pub fn sca_graph(space: ExtractionSpace) -> Graph {
    create_sca(space).expect("sca should wire cleanly")
}

/// Looks up a node id by name, panicking when absent.
#[allow(dead_code)]
pub fn node(graph: &Graph, name: &str) -> NodeId {
    graph
        .find(name)
        .unwrap_or_else(|| panic!("graph '{}' has no node '{}'", graph.name(), name))
}

/// All edges from one named node to another, as (source port, target port).
#[allow(dead_code)]
pub fn edges_between(graph: &Graph, source: &str, target: &str) -> Vec<(String, String)> {
    let source = node(graph, source);
    let target = node(graph, target);
    graph
        .edges()
        .iter()
        .filter(|e| e.source.node == source && e.target.node == target)
        .map(|e| (e.source.port.clone(), e.target.port.clone()))
        .collect()
}

/// Binds a seed list of length `n` and a FWHM list of length `m` to an SCA
/// graph's list inputs.
#[allow(dead_code)]
pub fn bind_sca_lists(graph: &mut Graph, n: usize, m: usize) {
    let seeds = node(graph, "seed_list_input");
    let seed_paths: Vec<String> = (0..n).map(|i| format!("seed_{}.nii.gz", i)).collect();
    graph
        .set_input(seeds, "seed_list", Value::paths(seed_paths))
        .expect("seed_list should bind");

    let fwhm = node(graph, "fwhm_input");
    let widths: Vec<f64> = (0..m).map(|i| 1.5 * (i + 1) as f64).collect();
    graph
        .set_input(fwhm, "fwhm", Value::floats(widths))
        .expect("fwhm should bind");
}
