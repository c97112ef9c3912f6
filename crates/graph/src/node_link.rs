//! Node-link JSON documents: `{directed, multigraph, graph, nodes, links}`.

use crate::error::{GraphError, Result};
use crate::types::{EdgeKind, GraphNode, KnowledgeGraph, NodeKind};
use serde::Deserialize;
use serde_json::{json, Map, Value};
use std::path::Path;

#[derive(Debug, Deserialize)]
struct NodeLinkDocument {
    #[serde(default = "directed")]
    directed: bool,
    #[serde(default)]
    multigraph: bool,
    nodes: Vec<Map<String, Value>>,
    #[serde(default, alias = "edges")]
    links: Vec<NodeLink>,
}

#[derive(Debug, Deserialize)]
struct NodeLink {
    source: String,
    target: String,
    #[serde(rename = "type")]
    kind: EdgeKind,
}

fn directed() -> bool {
    true
}

#[must_use]
pub fn to_node_link(graph: &KnowledgeGraph) -> Value {
    let nodes: Vec<Value> = graph
        .nodes()
        .map(|(_, node)| {
            let mut entry = Map::new();
            entry.insert("id".into(), Value::String(node.id.clone()));
            for (key, value) in node.attributes() {
                entry.insert(key.into(), Value::String(value));
            }
            Value::Object(entry)
        })
        .collect();
    let links: Vec<Value> = graph
        .edges()
        .map(|(source, target, kind)| {
            json!({"source": source.id, "target": target.id, "type": kind.as_str()})
        })
        .collect();

    json!({
        "directed": true,
        "multigraph": false,
        "graph": {},
        "nodes": nodes,
        "links": links,
    })
}

/// Rebuild a graph from a node-link document.
pub fn from_node_link(value: Value) -> Result<KnowledgeGraph> {
    let document: NodeLinkDocument = serde_json::from_value(value)?;
    if document.multigraph || !document.directed {
        log::warn!("node-link document is not a simple directed graph; reading it as one");
    }
    let mut graph = KnowledgeGraph::new();

    for entry in &document.nodes {
        graph.insert_node(node_from_attributes(entry)?);
    }
    for link in &document.links {
        let source = graph.require_node(&link.source)?;
        let target = graph.require_node(&link.target)?;
        graph.add_edge(source, target, link.kind);
    }
    Ok(graph)
}

pub fn read_node_link(path: &Path) -> Result<KnowledgeGraph> {
    let bytes = std::fs::read(path)?;
    from_node_link(serde_json::from_slice(&bytes)?)
}

fn text<'a>(entry: &'a Map<String, Value>, key: &str) -> Option<&'a str> {
    entry.get(key).and_then(Value::as_str).filter(|s| !s.is_empty())
}

/// Line numbers are written as strings but numbers are accepted too.
fn line(entry: &Map<String, Value>, key: &str) -> Option<u32> {
    match entry.get(key)? {
        Value::Number(n) => n.as_u64().and_then(|n| u32::try_from(n).ok()),
        Value::String(s) => s.parse().ok(),
        _ => None,
    }
}

fn node_from_attributes(entry: &Map<String, Value>) -> Result<GraphNode> {
    let id = text(entry, "id")
        .ok_or_else(|| GraphError::InvalidDocument("node without id".into()))?;
    let kind = text(entry, "type")
        .and_then(NodeKind::parse)
        .ok_or_else(|| {
            GraphError::InvalidDocument(format!("node {id}: missing or unknown type"))
        })?;
    let prefix = format!("{}::", kind.as_str());
    let label = text(entry, "label")
        .or_else(|| id.strip_prefix(prefix.as_str()))
        .unwrap_or(id);
    let start_line = line(entry, "start_line").or_else(|| line(entry, "line"));

    Ok(GraphNode {
        id: id.to_string(),
        kind,
        label: label.to_string(),
        name: text(entry, "name").unwrap_or(label).to_string(),
        owner: text(entry, "owner").map(str::to_string),
        file: text(entry, "file").map(str::to_string),
        start_line,
        end_line: line(entry, "end_line").or(start_line),
        description: text(entry, "description").map(str::to_string),
    })
}
