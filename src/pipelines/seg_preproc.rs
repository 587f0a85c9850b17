//! Tissue segmentation preprocessing graph.
//!
//! Segments the subject's skull-stripped anatomical image into cerebral
//! spinal fluid, gray matter and white matter, then for each tissue class:
//! registers the subject probability map and the population prior into native
//! functional space, intersects the two, thresholds and binarizes the
//! overlap, and masks the result by the preprocessed brain mask. The three
//! tissue branches are independent and identically shaped.
//!
//! The builder only declares shape. Tool failures propagate through the
//! external engine untouched.

use crate::error::GraphError;
use crate::graph::{EdgeTransform, Graph, Node, NodeId};
use crate::interface::Interface;

/// The tissue classes the segmentation tool separates.
///
/// The channel numbers are the segmentation tool's output ordering and must
/// not be rearranged; this enum is the single site declaring that contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TissueClass {
    Csf,
    Gray,
    White,
}

impl TissueClass {
    pub const ALL: [TissueClass; 3] = [TissueClass::Csf, TissueClass::Gray, TissueClass::White];

    /// Index of this tissue's probability map in the segmentation output.
    pub fn channel(self) -> usize {
        match self {
            TissueClass::Csf => 0,
            TissueClass::Gray => 1,
            TissueClass::White => 2,
        }
    }

    /// Short prefix used in node and output port names.
    pub fn prefix(self) -> &'static str {
        match self {
            TissueClass::Csf => "csf",
            TissueClass::Gray => "gm",
            TissueClass::White => "wm",
        }
    }

    /// Input port carrying this tissue's standard-space prior template.
    pub fn prior_port(self) -> &'static str {
        match self {
            TissueClass::Csf => "prior_csf",
            TissueClass::Gray => "prior_gray",
            TissueClass::White => "prior_white",
        }
    }

    /// Name of the threshold sweep input node for this tissue.
    pub fn threshold_input(self) -> &'static str {
        match self {
            TissueClass::Csf => "csf_threshold",
            TissueClass::Gray => "gm_threshold",
            TissueClass::White => "wm_threshold",
        }
    }
}

const INPUT_FIELDS: [&str; 9] = [
    "preprocessed_mask",
    "brain",
    "standard_res_brain",
    "example_func",
    "highres2example_func_mat",
    "stand2highres_warp",
    "prior_csf",
    "prior_gray",
    "prior_white",
];

const RAW_SEGMENT_OUTPUTS: [&str; 4] = [
    "probability_maps",
    "mixeltype",
    "partial_volume_map",
    "partial_volume_files",
];

/// Builds the segmentation preprocessing graph.
///
/// Input ports live on `inputspec` plus one threshold sweep node per tissue;
/// outputs are exposed on `outputspec`. Callers bind values to the input
/// ports and hand the graph to the execution engine.
pub fn create_seg_preproc() -> Result<Graph, GraphError> {
    let mut graph = Graph::new("seg_preproc");

    let inputspec = graph.add_node(Node::identity("inputspec", &INPUT_FIELDS))?;

    let mut output_fields: Vec<String> = Vec::new();
    for tissue in TissueClass::ALL {
        let p = tissue.prefix();
        for suffix in ["t12func", "mni2func", "combo", "bin", "mask"] {
            output_fields.push(format!("{}_{}", p, suffix));
        }
    }
    output_fields.push("global_mask".to_string());
    output_fields.extend(RAW_SEGMENT_OUTPUTS.iter().map(|f| f.to_string()));
    let output_refs: Vec<&str> = output_fields.iter().map(|f| f.as_str()).collect();
    let outputspec = graph.add_node(Node::identity("outputspec", &output_refs))?;

    let segment = graph.add_node(
        Node::new("segment", Interface::FastSegment)
            .param("img_type", 1)
            .param("segments", true)
            .param("probability_maps", true)
            .param("out_basename", "segment"),
    )?;
    graph.connect(inputspec, "brain", segment, "in_files")?;

    for field in RAW_SEGMENT_OUTPUTS {
        graph.connect(segment, field, outputspec, field)?;
    }
    graph.connect(inputspec, "preprocessed_mask", outputspec, "global_mask")?;

    for tissue in TissueClass::ALL {
        wire_tissue_branch(&mut graph, tissue, inputspec, segment, outputspec)?;
    }

    Ok(graph)
}

/// Wires one tissue's branch: select channel, register subject map and prior
/// to native space, intersect, threshold-binarize, mask. Fresh nodes per
/// branch; nothing is shared between tissues except the segmentation output.
fn wire_tissue_branch(
    graph: &mut Graph,
    tissue: TissueClass,
    inputspec: NodeId,
    segment: NodeId,
    outputspec: NodeId,
) -> Result<(), GraphError> {
    let p = tissue.prefix();

    let threshold = graph.add_node(Node::sweep(
        tissue.threshold_input(),
        tissue.threshold_input(),
    ))?;

    // Subject probability map, affine-resampled into functional space.
    let t1_to_native = graph.add_node(
        Node::map(
            &format!("{}_t1_to_native", p),
            Interface::Flirt,
            &["reference", "in_matrix_file"],
        )
        .param("apply_xfm", true),
    )?;
    graph.connect_with(
        segment,
        "probability_maps",
        t1_to_native,
        "in_file",
        EdgeTransform::SelectVolume(tissue.channel()),
    )?;
    graph.connect(inputspec, "example_func", t1_to_native, "reference")?;
    graph.connect(
        inputspec,
        "highres2example_func_mat",
        t1_to_native,
        "in_matrix_file",
    )?;

    // Population prior, warped from standard space. Nearest-neighbor keeps
    // the discrete tissue labeling intact.
    let mni_to_native = graph.add_node(
        Node::map(
            &format!("{}_mni_to_native", p),
            Interface::ApplyWarp,
            &["ref_file", "postmat"],
        )
        .param("interp", "nn"),
    )?;
    graph.connect(inputspec, tissue.prior_port(), mni_to_native, "in_file")?;
    graph.connect(inputspec, "example_func", mni_to_native, "ref_file")?;
    graph.connect(inputspec, "stand2highres_warp", mni_to_native, "field_file")?;
    graph.connect(
        inputspec,
        "highres2example_func_mat",
        mni_to_native,
        "postmat",
    )?;

    // Voxels where subject segmentation and prior agree.
    let overlap = graph.add_node(
        Node::map(
            &format!("overlap_{}_with_prior", p),
            Interface::MultiImageMaths,
            &["in_file", "operand_files"],
        )
        .param("op_string", "-mas %s"),
    )?;
    graph.connect(t1_to_native, "out_file", overlap, "in_file")?;
    graph.connect(mni_to_native, "out_file", overlap, "operand_files")?;

    let binarize = graph.add_node(Node::map(
        &format!("binarize_threshold_{}", p),
        Interface::ImageMaths,
        &["in_file"],
    ))?;
    graph.connect(overlap, "out_file", binarize, "in_file")?;
    graph.connect_with(
        threshold,
        tissue.threshold_input(),
        binarize,
        "op_string",
        EdgeTransform::ThresholdBinarize,
    )?;

    let mask = graph.add_node(
        Node::map(
            &format!("{}_mask", p),
            Interface::MultiImageMaths,
            &["in_file", "operand_files"],
        )
        .param("op_string", "-mas %s"),
    )?;
    graph.connect(binarize, "out_file", mask, "in_file")?;
    graph.connect(inputspec, "preprocessed_mask", mask, "operand_files")?;

    graph.connect(
        t1_to_native,
        "out_file",
        outputspec,
        &format!("{}_t12func", p),
    )?;
    graph.connect(
        mni_to_native,
        "out_file",
        outputspec,
        &format!("{}_mni2func", p),
    )?;
    graph.connect(overlap, "out_file", outputspec, &format!("{}_combo", p))?;
    graph.connect(binarize, "out_file", outputspec, &format!("{}_bin", p))?;
    graph.connect(mask, "out_file", outputspec, &format!("{}_mask", p))?;

    Ok(())
}
