//! Prelude module for convenient imports
//!
//! Re-exports the most commonly used types and functions so callers can pull
//! in the core surface with a single `use fmriflow::prelude::*;`.

// Graph model
pub use crate::graph::{Edge, EdgeTransform, Graph, Node, NodeId, PortRef, Value, fwhm_to_sigma};

// Tool interface catalog
pub use crate::interface::Interface;

// Pipeline builders
pub use crate::pipelines::{ExtractionSpace, TissueClass, create_sca, create_seg_preproc};

// Structural analysis
pub use crate::graph::analysis::{
    element_counts, isomorphic, path_length, signature, topo_order, upstream,
};
pub use crate::graph::viz::to_dot;

// Model configuration file
pub use crate::model_config::{FieldKind, FieldSpec, FieldValue, MODEL_FIELDS, ModelConfig};

// Error types
pub use crate::error::{AnalysisError, ArtifactError, ConfigError, GraphError, TransformError};

// Result type alias for convenience
pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;
