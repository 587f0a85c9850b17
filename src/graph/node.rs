use crate::graph::Value;
use crate::interface::Interface;
use ahash::AHashMap;
use serde::{Deserialize, Serialize};

/// Dense index of a node within its graph.
pub type NodeId = usize;

/// One external-tool invocation in a workflow graph.
///
/// A node's identity is fixed at creation: its interface, parameters and
/// iteration declaration never change once it has been added to a graph.
/// Branch duplication is done by constructing fresh nodes, never by cloning
/// an already-wired one.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Node {
    pub name: String,
    pub interface: Interface,
    /// Fixed tool parameters (switches, operator strings, thresholds).
    pub params: AHashMap<String, Value>,
    /// Input ports this node fans out over. A list of N values arriving on an
    /// iterated port expands the node into N parallel invocations, each
    /// producing one element of every output list. All iterated ports must
    /// receive equal-length lists at execution time.
    pub iter_fields: Vec<String>,
    /// Parameter sweep: the whole downstream subgraph is conceptually
    /// replicated once per element of this node's (single) field. Only
    /// meaningful on identity nodes.
    pub sweep: bool,
}

impl Node {
    /// A plain invocation node: consumes whole values, runs once.
    pub fn new(name: &str, interface: Interface) -> Self {
        Self {
            name: name.to_string(),
            interface,
            params: AHashMap::new(),
            iter_fields: Vec::new(),
            sweep: false,
        }
    }

    /// A map node fanning out over the given input ports.
    pub fn map(name: &str, interface: Interface, iter_fields: &[&str]) -> Self {
        Self {
            iter_fields: iter_fields.iter().map(|f| f.to_string()).collect(),
            ..Self::new(name, interface)
        }
    }

    /// A pass-through identity node declaring named external ports.
    pub fn identity(name: &str, fields: &[&str]) -> Self {
        Self::new(
            name,
            Interface::Identity {
                fields: fields.iter().map(|f| f.to_string()).collect(),
            },
        )
    }

    /// An identity node whose single field is a parameter sweep.
    pub fn sweep(name: &str, field: &str) -> Self {
        Self {
            sweep: true,
            ..Self::identity(name, &[field])
        }
    }

    /// Sets a fixed tool parameter, builder style.
    pub fn param(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.params.insert(key.to_string(), value.into());
        self
    }

    pub fn is_map(&self) -> bool {
        !self.iter_fields.is_empty()
    }

    pub fn iterates(&self, port: &str) -> bool {
        self.iter_fields.iter().any(|f| f == port)
    }

    pub fn is_identity(&self) -> bool {
        matches!(self.interface, Interface::Identity { .. })
    }
}
