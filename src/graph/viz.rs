use super::Graph;
use std::fmt::Write;

/// Renders a graph as Graphviz DOT text for visual inspection.
///
/// Map nodes are drawn with a double border; edges are labeled with their
/// port pair and, when present, the transform applied in between.
pub fn to_dot(graph: &Graph) -> String {
    let mut out = String::new();
    writeln!(&mut out, "digraph {} {{", sanitize(graph.name())).unwrap();
    writeln!(&mut out, "    rankdir=LR;").unwrap();
    writeln!(&mut out, "    node [shape=box, fontname=\"monospace\"];").unwrap();

    for (id, node) in graph.nodes().iter().enumerate() {
        let label = match node.interface.command() {
            Some(command) => format!("{}\\n{}", node.name, command),
            None => node.name.clone(),
        };
        let style = if node.is_map() { ", peripheries=2" } else { "" };
        writeln!(&mut out, "    n{} [label=\"{}\"{}];", id, label, style).unwrap();
    }

    for edge in graph.edges() {
        let mut label = format!("{} > {}", edge.source.port, edge.target.port);
        if let Some(transform) = &edge.transform {
            label = format!("{} [{}]", label, transform);
        }
        writeln!(
            &mut out,
            "    n{} -> n{} [label=\"{}\"];",
            edge.source.node, edge.target.node, label
        )
        .unwrap();
    }

    out.push_str("}\n");
    out
}

fn sanitize(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_alphanumeric() { c } else { '_' })
        .collect()
}
