//! Graphviz render plan: node color by kind, edge color by member/other.

use crate::error::Result;
use crate::types::{EdgeKind, KnowledgeGraph, NodeKind};
use petgraph::dot::{Config, Dot};
use petgraph::visit::EdgeRef;
use std::path::Path;

pub const CLASS_COLOR: &str = "#2c7bb6";
pub const METHOD_COLOR: &str = "#1a9641";
pub const FUNCTION_COLOR: &str = "#fdae61";
pub const EXTERNAL_FUNCTION_COLOR: &str = "#d7191c";
pub const UNKNOWN_COLOR: &str = "#aaaaaa";
pub const MEMBER_EDGE_COLOR: &str = "#313695";
pub const OTHER_EDGE_COLOR: &str = "#7f7f7f";

#[must_use]
pub const fn node_color(kind: NodeKind) -> &'static str {
    match kind {
        NodeKind::Class => CLASS_COLOR,
        NodeKind::Method => METHOD_COLOR,
        NodeKind::Function => FUNCTION_COLOR,
        NodeKind::ExternalFunction => EXTERNAL_FUNCTION_COLOR,
    }
}

/// Color for a raw type tag, e.g. one read from a foreign document.
#[must_use]
pub fn tag_color(tag: &str) -> &'static str {
    NodeKind::parse(tag).map_or(UNKNOWN_COLOR, node_color)
}

#[must_use]
pub const fn edge_color(kind: EdgeKind) -> &'static str {
    match kind {
        EdgeKind::Member => MEMBER_EDGE_COLOR,
        EdgeKind::Calls => OTHER_EDGE_COLOR,
    }
}

fn quoted(text: &str) -> String {
    format!("\"{}\"", text.replace('\\', "\\\\").replace('"', "\\\""))
}

/// Graphviz document labelled with display names.
#[must_use]
pub fn to_dot(graph: &KnowledgeGraph) -> String {
    let dot = Dot::with_attr_getters(
        graph.inner(),
        &[Config::NodeNoLabel, Config::EdgeNoLabel],
        &|_, edge| {
            let kind = edge.weight().kind;
            format!(
                "label = {}, color = {}",
                quoted(kind.as_str()),
                quoted(edge_color(kind))
            )
        },
        &|_, (_, node)| {
            format!(
                "label = {}, tooltip = {}, style = filled, fillcolor = {}",
                quoted(&node.name),
                quoted(&node.id),
                quoted(node_color(node.kind))
            )
        },
    );
    format!("{dot}")
}

/// Write the render plan to `path`. Returns `false` without writing when the
/// graph is empty.
pub fn render_dot(graph: &KnowledgeGraph, path: &Path) -> Result<bool> {
    if graph.is_empty() {
        log::info!("Graph is empty; skipping render");
        return Ok(false);
    }
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, to_dot(graph))?;
    log::info!("Render plan written to {}", path.display());
    Ok(true)
}
