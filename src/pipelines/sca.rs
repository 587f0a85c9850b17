//! Seed-based correlation analysis graph.
//!
//! Correlates every brain voxel's time series against the mean time series of
//! each seed region, Fisher Z-transforms the correlation maps, registers them
//! to standard space and smooths them there. The seed time series can be
//! extracted either in the subject's native space (seeds warped down first,
//! nearest-neighbor) or in standard space (functional warped up first); both
//! strategies share the same tail.

use crate::error::GraphError;
use crate::graph::{EdgeTransform, Graph, Node, NodeId};
use crate::interface::Interface;
use std::fmt;
use std::str::FromStr;

/// Where the seed time series is extracted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractionSpace {
    /// Warp each seed into the subject's native space and extract there.
    Native,
    /// Warp the functional series into standard space and extract there.
    Mni,
}

impl FromStr for ExtractionSpace {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "native" => Ok(ExtractionSpace::Native),
            "mni" => Ok(ExtractionSpace::Mni),
            other => Err(format!(
                "Unknown extraction space '{}', expected 'native' or 'mni'",
                other
            )),
        }
    }
}

impl fmt::Display for ExtractionSpace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExtractionSpace::Native => write!(f, "native"),
            ExtractionSpace::Mni => write!(f, "mni"),
        }
    }
}

const INPUT_FIELDS: [&str; 7] = [
    "ref",
    "premat",
    "postmat",
    "rest_res_filt",
    "fieldcoeff_file",
    "rest_mask2standard",
    "standard",
];

const OUTPUT_FIELDS: [&str; 4] = [
    "correlations",
    "z_trans_correlations",
    "z_2standard",
    "z_2standard_fwhm",
];

/// Builds the seed correlation graph for the chosen extraction space.
///
/// `seed_list_input.seed_list` maps 1:1 onto per-seed outputs;
/// `fwhm_input.fwhm` sweeps the smoothing kernel widths, so the smoothed
/// output fans out to seeds x widths elements. Sibling mapped elements carry
/// no ordering dependency between each other.
pub fn create_sca(space: ExtractionSpace) -> Result<Graph, GraphError> {
    let mut graph = Graph::new("sca_workflow");

    let inputspec = graph.add_node(Node::identity("inputspec", &INPUT_FIELDS))?;
    let seed_list = graph.add_node(Node::identity("seed_list_input", &["seed_list"]))?;
    let fwhm = graph.add_node(Node::sweep("fwhm_input", "fwhm"))?;
    let outputspec = graph.add_node(Node::identity("outputspec", &OUTPUT_FIELDS))?;

    let time_series = graph.add_node(
        Node::map("time_series", Interface::RoiStats, &["mask"])
            .param("quiet", true)
            .param("mask_f2short", true),
    )?;

    let print_to_file = graph.add_node(Node::map(
        "print_timeseries_to_file",
        Interface::TimeSeriesToFile,
        &["time_series"],
    ))?;

    let corr = graph.add_node(
        Node::map("corr", Interface::Fim, &["ideal_file"])
            .param("fim_thr", 0.0009)
            .param("out", "Correlation"),
    )?;

    match space {
        ExtractionSpace::Native => {
            wire_native_extraction(&mut graph, inputspec, seed_list, time_series)?
        }
        ExtractionSpace::Mni => wire_mni_extraction(&mut graph, inputspec, seed_list, time_series)?,
    }

    graph.connect(time_series, "stats", print_to_file, "time_series")?;
    graph.connect(print_to_file, "one_d_file", corr, "ideal_file")?;
    graph.connect(inputspec, "rest_res_filt", corr, "in_file")?;

    wire_common_tail(&mut graph, inputspec, fwhm, corr, outputspec)?;

    Ok(graph)
}

/// Native strategy: register each seed down into functional space
/// (nearest-neighbor, masks stay binary) and extract against the unwarped
/// functional series.
fn wire_native_extraction(
    graph: &mut Graph,
    inputspec: NodeId,
    seed_list: NodeId,
    time_series: NodeId,
) -> Result<(), GraphError> {
    let warp_to_native = graph.add_node(
        Node::map("warp_to_native", Interface::ApplyWarp, &["in_file"]).param("interp", "nn"),
    )?;
    graph.connect(seed_list, "seed_list", warp_to_native, "in_file")?;
    graph.connect(inputspec, "ref", warp_to_native, "ref_file")?;
    graph.connect(inputspec, "fieldcoeff_file", warp_to_native, "field_file")?;
    graph.connect(inputspec, "postmat", warp_to_native, "postmat")?;

    graph.connect(inputspec, "rest_res_filt", time_series, "in_file")?;
    graph.connect(warp_to_native, "out_file", time_series, "mask")?;
    Ok(())
}

/// Standard-space strategy: register the functional series up into standard
/// space and extract with the seeds as given. No seed registration node
/// exists in this mode.
fn wire_mni_extraction(
    graph: &mut Graph,
    inputspec: NodeId,
    seed_list: NodeId,
    time_series: NodeId,
) -> Result<(), GraphError> {
    let warp_filt = graph.add_node(Node::new(
        "warp_to_standard_input_functional",
        Interface::ApplyWarp,
    ))?;
    graph.connect(inputspec, "rest_res_filt", warp_filt, "in_file")?;
    graph.connect(inputspec, "standard", warp_filt, "ref_file")?;
    graph.connect(inputspec, "fieldcoeff_file", warp_filt, "field_file")?;
    graph.connect(inputspec, "premat", warp_filt, "premat")?;

    graph.connect(warp_filt, "out_file", time_series, "in_file")?;
    graph.connect(seed_list, "seed_list", time_series, "mask")?;
    Ok(())
}

/// The tail both strategies share: Fisher Z-transform per seed, register each
/// Z-map to standard space, smooth there and clip the smoothing bleed with
/// the standard-space brain mask.
fn wire_common_tail(
    graph: &mut Graph,
    inputspec: NodeId,
    fwhm: NodeId,
    corr: NodeId,
    outputspec: NodeId,
) -> Result<(), GraphError> {
    let z_trans = graph.add_node(
        Node::map("z_trans", Interface::Calc, &["infile_a"])
            .param("expr", "log((1+a)/(1-a))/2"),
    )?;
    graph.connect(corr, "out_file", z_trans, "infile_a")?;

    let z_to_standard = graph.add_node(Node::map(
        "z_to_standard",
        Interface::ApplyWarp,
        &["in_file"],
    ))?;
    graph.connect(z_trans, "out_file", z_to_standard, "in_file")?;
    graph.connect(inputspec, "standard", z_to_standard, "ref_file")?;
    graph.connect(inputspec, "fieldcoeff_file", z_to_standard, "field_file")?;
    graph.connect(inputspec, "premat", z_to_standard, "premat")?;

    let smooth = graph.add_node(Node::map(
        "smooth_mni",
        Interface::MultiImageMaths,
        &["in_file"],
    ))?;
    graph.connect(z_to_standard, "out_file", smooth, "in_file")?;
    graph.connect_with(
        fwhm,
        "fwhm",
        smooth,
        "op_string",
        EdgeTransform::GaussianSmoothOp,
    )?;
    graph.connect(inputspec, "rest_mask2standard", smooth, "operand_files")?;

    graph.connect(corr, "out_file", outputspec, "correlations")?;
    graph.connect(z_trans, "out_file", outputspec, "z_trans_correlations")?;
    graph.connect(z_to_standard, "out_file", outputspec, "z_2standard")?;
    graph.connect(smooth, "out_file", outputspec, "z_2standard_fwhm")?;
    Ok(())
}
