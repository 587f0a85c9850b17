//! The in-memory workflow graph: invocation nodes, port-to-port edges and the
//! values bound to a graph's external inputs.
//!
//! A graph only records *shape*. Scheduling, process spawning and failure
//! handling are the external engine's concern; the single structural invariant
//! enforced here at wiring time is the single-writer rule for input ports.
//! Acyclicity is not checked during construction (the engine detects cycles at
//! execution time); [`analysis`] offers it as an explicit query instead.

pub mod analysis;
pub mod node;
pub mod transform;
pub mod value;
pub mod viz;

pub use node::{Node, NodeId};
pub use transform::{EdgeTransform, fwhm_to_sigma};
pub use value::Value;

use crate::error::{ArtifactError, GraphError};
use ahash::AHashMap;
use bincode::config::standard;
use bincode::serde::{decode_from_slice, encode_to_vec};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// A named port on a specific node.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PortRef {
    pub node: NodeId,
    pub port: String,
}

/// A directed binding from a producing output port to a consuming input port,
/// optionally passing the value through a pure transform.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Edge {
    pub source: PortRef,
    pub target: PortRef,
    pub transform: Option<EdgeTransform>,
}

/// A fully declared workflow graph.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Graph {
    name: String,
    nodes: Vec<Node>,
    ids: AHashMap<String, NodeId>,
    edges: Vec<Edge>,
    bound: AHashMap<PortRef, Value>,
}

impl Graph {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            nodes: Vec::new(),
            ids: AHashMap::new(),
            edges: Vec::new(),
            bound: AHashMap::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Adds a node, rejecting duplicate names.
    pub fn add_node(&mut self, node: Node) -> Result<NodeId, GraphError> {
        if self.ids.contains_key(&node.name) {
            return Err(GraphError::DuplicateNodeName {
                name: node.name.clone(),
            });
        }
        let id = self.nodes.len();
        self.ids.insert(node.name.clone(), id);
        self.nodes.push(node);
        Ok(id)
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id]
    }

    pub fn find(&self, name: &str) -> Option<NodeId> {
        self.ids.get(name).copied()
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    /// Connects an output port to an input port.
    pub fn connect(
        &mut self,
        source: NodeId,
        source_port: &str,
        target: NodeId,
        target_port: &str,
    ) -> Result<(), GraphError> {
        self.add_edge(source, source_port, target, target_port, None)
    }

    /// Connects an output port to an input port through a pure transform.
    pub fn connect_with(
        &mut self,
        source: NodeId,
        source_port: &str,
        target: NodeId,
        target_port: &str,
        transform: EdgeTransform,
    ) -> Result<(), GraphError> {
        self.add_edge(source, source_port, target, target_port, Some(transform))
    }

    fn add_edge(
        &mut self,
        source: NodeId,
        source_port: &str,
        target: NodeId,
        target_port: &str,
        transform: Option<EdgeTransform>,
    ) -> Result<(), GraphError> {
        let source_node = self.checked(source)?;
        if !source_node.interface.has_output_port(source_port) {
            return Err(GraphError::UnknownOutputPort {
                node: source_node.name.clone(),
                port: source_port.to_string(),
            });
        }
        let target_node = self.checked(target)?;
        if !target_node.interface.has_input_port(target_port) {
            return Err(GraphError::UnknownInputPort {
                node: target_node.name.clone(),
                port: target_port.to_string(),
            });
        }

        let target_ref = PortRef {
            node: target,
            port: target_port.to_string(),
        };
        if self.edge_into(target, target_port).is_some() || self.bound.contains_key(&target_ref) {
            return Err(GraphError::InputAlreadyBound {
                node: target_node.name.clone(),
                port: target_port.to_string(),
            });
        }

        self.edges.push(Edge {
            source: PortRef {
                node: source,
                port: source_port.to_string(),
            },
            target: target_ref,
            transform,
        });
        Ok(())
    }

    /// Binds a value (file path, scalar or list) to an unconnected input port.
    /// Rebinding the same port replaces the previous value.
    pub fn set_input(
        &mut self,
        node: NodeId,
        port: &str,
        value: impl Into<Value>,
    ) -> Result<(), GraphError> {
        let target = self.checked(node)?;
        if !target.interface.has_input_port(port) {
            return Err(GraphError::UnknownInputPort {
                node: target.name.clone(),
                port: port.to_string(),
            });
        }
        if self.edge_into(node, port).is_some() {
            return Err(GraphError::InputAlreadyBound {
                node: target.name.clone(),
                port: port.to_string(),
            });
        }
        self.bound.insert(
            PortRef {
                node,
                port: port.to_string(),
            },
            value.into(),
        );
        Ok(())
    }

    /// The value bound to an input port, if any.
    pub fn bound_input(&self, node: NodeId, port: &str) -> Option<&Value> {
        self.bound.get(&PortRef {
            node,
            port: port.to_string(),
        })
    }

    /// The single edge feeding an input port, if one is wired.
    pub fn edge_into(&self, node: NodeId, port: &str) -> Option<&Edge> {
        self.edges
            .iter()
            .find(|e| e.target.node == node && e.target.port == port)
    }

    pub fn edges_into(&self, node: NodeId) -> impl Iterator<Item = &Edge> {
        self.edges.iter().filter(move |e| e.target.node == node)
    }

    pub fn edges_from(&self, node: NodeId) -> impl Iterator<Item = &Edge> {
        self.edges.iter().filter(move |e| e.source.node == node)
    }

    fn checked(&self, id: NodeId) -> Result<&Node, GraphError> {
        self.nodes
            .get(id)
            .ok_or(GraphError::NodeIndexOutOfRange { index: id })
    }

    /// Serializes the wired graph to a portable byte artifact.
    pub fn to_bytes(&self) -> Result<Vec<u8>, ArtifactError> {
        encode_to_vec(self, standard()).map_err(|e| ArtifactError::Encode(e.to_string()))
    }

    /// Restores a graph from a byte artifact.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ArtifactError> {
        decode_from_slice(bytes, standard())
            .map(|(graph, _)| graph) // bincode 2 returns (data, bytes_read)
            .map_err(|e| ArtifactError::Decode(e.to_string()))
    }

    /// Saves the graph artifact to a file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ArtifactError> {
        fs::write(path, self.to_bytes()?)?;
        Ok(())
    }

    /// Loads a graph artifact from a file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ArtifactError> {
        Self::from_bytes(&fs::read(path)?)
    }
}
