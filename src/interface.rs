//! Catalog of the external tool interfaces the pipelines invoke.
//!
//! Each variant declares, at a single site, the command it runs and the named
//! input and output ports the graph layer is allowed to wire. Execution of the
//! commands themselves belongs to the external engine; this catalog only fixes
//! the connection contract.

use serde::{Deserialize, Serialize};
use std::fmt;

/// One external tool an invocation node can wrap.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Interface {
    /// Pass-through node declaring a graph's external input or output contract.
    Identity { fields: Vec<String> },
    /// FSL `fast`: whole-brain tissue segmentation.
    FastSegment,
    /// FSL `flirt`: linear (affine) image resampling.
    Flirt,
    /// FSL `applywarp`: nonlinear warp-based resampling.
    ApplyWarp,
    /// FSL `fslmaths` driven by an operator string.
    ImageMaths,
    /// FSL `fslmaths` with operand files substituted into the operator string.
    MultiImageMaths,
    /// AFNI `3dROIstats`: mean time series within a mask.
    RoiStats,
    /// AFNI `3dfim+`: voxel-wise correlation against a reference time series.
    Fim,
    /// AFNI `3dcalc`: voxel-wise arithmetic expression.
    Calc,
    /// In-process helper writing an extracted time series to a 1D text file.
    TimeSeriesToFile,
}

impl Interface {
    /// Short discriminant used in graph signatures and DOT labels.
    pub fn kind(&self) -> &'static str {
        match self {
            Interface::Identity { .. } => "identity",
            Interface::FastSegment => "fast_segment",
            Interface::Flirt => "flirt",
            Interface::ApplyWarp => "apply_warp",
            Interface::ImageMaths => "image_maths",
            Interface::MultiImageMaths => "multi_image_maths",
            Interface::RoiStats => "roi_stats",
            Interface::Fim => "fim",
            Interface::Calc => "calc",
            Interface::TimeSeriesToFile => "ts_to_file",
        }
    }

    /// The external command this interface runs. Identity nodes and in-process
    /// helpers have none.
    pub fn command(&self) -> Option<&'static str> {
        match self {
            Interface::Identity { .. } | Interface::TimeSeriesToFile => None,
            Interface::FastSegment => Some("fast"),
            Interface::Flirt => Some("flirt"),
            Interface::ApplyWarp => Some("applywarp"),
            Interface::ImageMaths | Interface::MultiImageMaths => Some("fslmaths"),
            Interface::RoiStats => Some("3dROIstats"),
            Interface::Fim => Some("3dfim+"),
            Interface::Calc => Some("3dcalc"),
        }
    }

    /// Named input ports an edge may terminate at.
    pub fn input_ports(&self) -> Vec<&str> {
        match self {
            Interface::Identity { fields } => fields.iter().map(|f| f.as_str()).collect(),
            Interface::FastSegment => vec!["in_files"],
            Interface::Flirt => vec!["in_file", "reference", "in_matrix_file"],
            Interface::ApplyWarp => {
                vec!["in_file", "ref_file", "field_file", "premat", "postmat"]
            }
            Interface::ImageMaths => vec!["in_file", "op_string"],
            Interface::MultiImageMaths => vec!["in_file", "operand_files", "op_string"],
            Interface::RoiStats => vec!["in_file", "mask"],
            Interface::Fim => vec!["in_file", "ideal_file"],
            Interface::Calc => vec!["infile_a"],
            Interface::TimeSeriesToFile => vec!["time_series"],
        }
    }

    /// Named output ports an edge may originate from.
    pub fn output_ports(&self) -> Vec<&str> {
        match self {
            Interface::Identity { fields } => fields.iter().map(|f| f.as_str()).collect(),
            Interface::FastSegment => vec![
                "probability_maps",
                "mixeltype",
                "partial_volume_map",
                "partial_volume_files",
            ],
            Interface::Flirt
            | Interface::ApplyWarp
            | Interface::ImageMaths
            | Interface::MultiImageMaths
            | Interface::Fim
            | Interface::Calc => vec!["out_file"],
            Interface::RoiStats => vec!["stats"],
            Interface::TimeSeriesToFile => vec!["one_d_file"],
        }
    }

    pub fn has_input_port(&self, port: &str) -> bool {
        self.input_ports().iter().any(|p| *p == port)
    }

    pub fn has_output_port(&self, port: &str) -> bool {
        self.output_ports().iter().any(|p| *p == port)
    }
}

impl fmt::Display for Interface {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.command() {
            Some(cmd) => write!(f, "{} ({})", self.kind(), cmd),
            None => write!(f, "{}", self.kind()),
        }
    }
}
