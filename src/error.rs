use crate::graph::Value;
use thiserror::Error;

/// Errors that can occur while wiring a workflow graph.
#[derive(Error, Debug, Clone)]
pub enum GraphError {
    #[error("A node named '{name}' already exists in this graph")]
    DuplicateNodeName { name: String },

    #[error("Node index {index} does not refer to a node in this graph")]
    NodeIndexOutOfRange { index: usize },

    #[error("Node '{node}' has no input port named '{port}'")]
    UnknownInputPort { node: String, port: String },

    #[error("Node '{node}' has no output port named '{port}'")]
    UnknownOutputPort { node: String, port: String },

    #[error(
        "Input port '{port}' of node '{node}' is already bound; each input accepts a single writer"
    )]
    InputAlreadyBound { node: String, port: String },
}

/// Errors raised when an edge transform is applied to an incompatible value.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TransformError {
    #[error("Volume index {index} is out of range for a {len}-channel output")]
    VolumeIndexOutOfRange { index: usize, len: usize },

    #[error("Transform '{transform}' expected {expected}, but found value '{found}'")]
    TypeMismatch {
        transform: &'static str,
        expected: &'static str,
        found: Value,
    },
}

/// Errors reported by the structural analysis queries.
#[derive(Error, Debug, Clone)]
pub enum AnalysisError {
    #[error("Graph '{graph}' contains a cycle and cannot be ordered")]
    CycleDetected { graph: String },

    #[error("Iterated inputs of node '{node}' received lists of unequal lengths: {lengths:?}")]
    MismatchedIterLengths { node: String, lengths: Vec<usize> },
}

/// Errors that can occur when persisting or restoring a graph artifact.
#[derive(Error, Debug)]
pub enum ArtifactError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to encode graph artifact: {0}")]
    Encode(String),

    #[error("Failed to decode graph artifact: {0}")]
    Decode(String),
}

/// Errors produced while reading, writing or validating a model configuration file.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("'{field}' is not a declared model configuration field")]
    UnknownField { field: String },

    #[error("Line {line} is not a 'key : value' assignment")]
    MalformedLine { line: usize },

    #[error("Field '{field}' expected {expected}, but found '{value}'")]
    InvalidValue {
        field: String,
        value: String,
        expected: &'static str,
    },

    #[error("{field} field is empty")]
    EmptyField { field: String },

    #[error("Field '{field}' only allows 1 and 0 entries, found {value}")]
    BinaryFlagOutOfRange { field: String, value: i64 },

    #[error(
        "Number of values in '{field}' ({found}) does not match the {expected} columns in the model"
    )]
    LengthMismatch {
        field: String,
        expected: usize,
        found: usize,
    },

    #[error("Grouping variable '{variable}' is not a column in the model")]
    InvalidGroupingVariable { variable: String },

    #[error("Field '{field}' contains a path that does not exist: '{path}'")]
    MissingPath { field: String, path: String },
}
