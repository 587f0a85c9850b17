//! Read-only structural queries over a wired graph.
//!
//! Nothing here mutates a graph or executes anything; these are the questions
//! a caller (or a test) can ask about shape: ordering, reachability, path
//! length, structural equality between two builds, and how many output
//! elements each node fans out to given the list inputs bound so far.

use super::{Graph, NodeId};
use crate::error::AnalysisError;
use ahash::{AHashMap, AHashSet};
use itertools::Itertools;
use std::collections::{BTreeMap, VecDeque};

/// Topological order of the graph's nodes, or an error if a cycle exists.
///
/// Construction never runs this; cycle detection is an explicit query.
pub fn topo_order(graph: &Graph) -> Result<Vec<NodeId>, AnalysisError> {
    let n = graph.nodes().len();
    let mut indegree = vec![0usize; n];
    let mut successors: Vec<Vec<NodeId>> = vec![Vec::new(); n];
    for edge in graph.edges() {
        successors[edge.source.node].push(edge.target.node);
        indegree[edge.target.node] += 1;
    }

    let mut ready: VecDeque<NodeId> = (0..n).filter(|id| indegree[*id] == 0).collect();
    let mut order = Vec::with_capacity(n);
    while let Some(id) = ready.pop_front() {
        order.push(id);
        for &next in &successors[id] {
            indegree[next] -= 1;
            if indegree[next] == 0 {
                ready.push_back(next);
            }
        }
    }

    if order.len() == n {
        Ok(order)
    } else {
        Err(AnalysisError::CycleDetected {
            graph: graph.name().to_string(),
        })
    }
}

/// All nodes a node transitively consumes from.
pub fn upstream(graph: &Graph, node: NodeId) -> AHashSet<NodeId> {
    let mut seen = AHashSet::new();
    let mut frontier = vec![node];
    while let Some(id) = frontier.pop() {
        for edge in graph.edges_into(id) {
            if seen.insert(edge.source.node) {
                frontier.push(edge.source.node);
            }
        }
    }
    seen
}

/// Shortest number of edges from one node to another, if a path exists.
pub fn path_length(graph: &Graph, from: NodeId, to: NodeId) -> Option<usize> {
    if from == to {
        return Some(0);
    }
    let mut dist: AHashMap<NodeId, usize> = AHashMap::new();
    dist.insert(from, 0);
    let mut frontier = VecDeque::from([from]);
    while let Some(id) = frontier.pop_front() {
        let here = dist[&id];
        for edge in graph.edges_from(id) {
            let next = edge.target.node;
            if next == to {
                return Some(here + 1);
            }
            if !dist.contains_key(&next) {
                dist.insert(next, here + 1);
                frontier.push_back(next);
            }
        }
    }
    None
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
struct NodeSummary {
    name: String,
    kind: String,
    ports: Vec<String>,
    iter_fields: Vec<String>,
    sweep: bool,
    params: Vec<(String, String)>,
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
struct EdgeSummary {
    source: (String, String),
    transform: String,
    target: (String, String),
}

/// A canonical structural summary of a graph, independent of insertion order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GraphSignature {
    nodes: Vec<NodeSummary>,
    edges: Vec<EdgeSummary>,
}

/// Computes the canonical signature used for isomorphism comparison.
pub fn signature(graph: &Graph) -> GraphSignature {
    let nodes = graph
        .nodes()
        .iter()
        .map(|node| NodeSummary {
            name: node.name.clone(),
            kind: node.interface.kind().to_string(),
            ports: node
                .interface
                .input_ports()
                .iter()
                .map(|p| p.to_string())
                .sorted()
                .collect(),
            iter_fields: node.iter_fields.iter().cloned().sorted().collect(),
            sweep: node.sweep,
            params: node
                .params
                .iter()
                .map(|(k, v)| (k.clone(), v.to_string()))
                .sorted()
                .collect(),
        })
        .sorted()
        .collect();

    let edges = graph
        .edges()
        .iter()
        .map(|edge| EdgeSummary {
            source: (
                graph.node(edge.source.node).name.clone(),
                edge.source.port.clone(),
            ),
            transform: edge
                .transform
                .as_ref()
                .map(|t| t.to_string())
                .unwrap_or_default(),
            target: (
                graph.node(edge.target.node).name.clone(),
                edge.target.port.clone(),
            ),
        })
        .sorted()
        .collect();

    GraphSignature { nodes, edges }
}

/// Whether two graphs are structurally indistinguishable.
pub fn isomorphic(a: &Graph, b: &Graph) -> bool {
    signature(a) == signature(b)
}

/// Per-port element cardinality: a plain list length and the sweep axes the
/// port inherits. Total fan-out is the product of both dimensions.
#[derive(Debug, Clone)]
struct Card {
    len: usize,
    sweeps: BTreeMap<String, usize>,
}

impl Card {
    fn unit() -> Self {
        Self {
            len: 1,
            sweeps: BTreeMap::new(),
        }
    }

    fn total(&self) -> usize {
        self.len.max(1) * self.sweeps.values().product::<usize>()
    }
}

/// Number of output elements each output port materializes, keyed
/// `"node.port"`, given the list inputs currently bound to the graph.
///
/// Mapped inputs of one node must receive equal-length lists; this query
/// checks that eagerly and reports the offending node, which the engine
/// itself would only discover at execution time. Sweep inputs multiply every
/// downstream node Cartesianly, so seeds x kernel widths yields N x M
/// smoothed outputs.
pub fn element_counts(graph: &Graph) -> Result<AHashMap<String, usize>, AnalysisError> {
    let order = topo_order(graph)?;
    let mut cards: AHashMap<(NodeId, String), Card> = AHashMap::new();
    let mut counts = AHashMap::new();

    for id in order {
        let node = graph.node(id);
        let input_ports: Vec<String> = node
            .interface
            .input_ports()
            .iter()
            .map(|p| p.to_string())
            .collect();

        let mut incoming: AHashMap<String, Card> = AHashMap::new();
        for port in &input_ports {
            let card = if let Some(edge) = graph.edge_into(id, port) {
                cards
                    .get(&(edge.source.node, edge.source.port.clone()))
                    .cloned()
                    .unwrap_or_else(Card::unit)
            } else if let Some(value) = graph.bound_input(id, port) {
                Card {
                    len: value.fan_width(),
                    sweeps: BTreeMap::new(),
                }
            } else {
                Card::unit()
            };
            incoming.insert(port.clone(), card);
        }

        let mut sweeps = BTreeMap::new();
        for card in incoming.values() {
            for (axis, width) in &card.sweeps {
                sweeps.insert(axis.clone(), *width);
            }
        }

        if node.is_identity() {
            if node.sweep {
                // The field's list length becomes a new sweep axis.
                for port in &input_ports {
                    let width = incoming[port].len.max(1);
                    let mut axes = sweeps.clone();
                    axes.insert(node.name.clone(), width);
                    cards.insert((id, port.clone()), Card { len: 1, sweeps: axes });
                }
            } else {
                // Pass-through: each field keeps its own cardinality.
                for port in &input_ports {
                    cards.insert((id, port.clone()), incoming[port].clone());
                }
            }
        } else {
            let zip = if node.is_map() {
                let widths: Vec<usize> = node
                    .iter_fields
                    .iter()
                    .filter_map(|f| incoming.get(f))
                    .map(|c| c.len)
                    .filter(|len| *len > 1)
                    .sorted()
                    .dedup()
                    .collect();
                if widths.len() > 1 {
                    return Err(AnalysisError::MismatchedIterLengths {
                        node: node.name.clone(),
                        lengths: widths,
                    });
                }
                widths.first().copied().unwrap_or(1)
            } else {
                // A plain node consumes lists whole and runs once.
                1
            };
            let card = Card { len: zip, sweeps };
            for port in node.interface.output_ports() {
                cards.insert((id, port.to_string()), card.clone());
            }
        }

        for port in node.interface.output_ports() {
            if let Some(card) = cards.get(&(id, port.to_string())) {
                counts.insert(format!("{}.{}", node.name, port), card.total());
            }
        }
    }

    Ok(counts)
}
