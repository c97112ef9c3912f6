use kgraph_extract::Location;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Closed set of node kinds. The tag doubles as the node identity prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    Class,
    Method,
    Function,
    ExternalFunction,
}

impl NodeKind {
    pub const ALL: [Self; 4] = [
        Self::Class,
        Self::Method,
        Self::Function,
        Self::ExternalFunction,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Class => "class",
            Self::Method => "method",
            Self::Function => "function",
            Self::ExternalFunction => "external_function",
        }
    }

    #[must_use]
    pub fn parse(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.as_str() == tag)
    }

    /// Methods, functions and external stubs share one qualified-name index.
    #[must_use]
    pub const fn is_function_like(self) -> bool {
        !matches!(self, Self::Class)
    }

    /// `"<kind>::<qualified_name>"`
    #[must_use]
    pub fn node_id(self, qualified_name: &str) -> String {
        format!("{}::{qualified_name}", self.as_str())
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgeKind {
    /// class -> method
    Member,
    /// caller -> callee
    Calls,
}

impl EdgeKind {
    pub const ALL: [Self; 2] = [Self::Member, Self::Calls];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Member => "member",
            Self::Calls => "calls",
        }
    }

    #[must_use]
    pub fn parse(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.as_str() == tag)
    }

    /// Relationship type used by graph databases (`MEMBER`, `CALLS`).
    #[must_use]
    pub fn relationship_type(self) -> String {
        self.as_str().to_ascii_uppercase()
    }
}

impl fmt::Display for EdgeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Node in the knowledge graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GraphNode {
    /// `<kind>::<qualified_name>`
    pub id: String,
    pub kind: NodeKind,
    /// Qualified name
    pub label: String,
    /// Display name
    pub name: String,
    pub owner: Option<String>,
    pub file: Option<String>,
    pub start_line: Option<u32>,
    pub end_line: Option<u32>,
    pub description: Option<String>,
}

impl GraphNode {
    #[must_use]
    pub fn class(qualified_name: &str) -> Self {
        Self {
            id: NodeKind::Class.node_id(qualified_name),
            kind: NodeKind::Class,
            label: qualified_name.to_string(),
            name: qualified_name.to_string(),
            owner: None,
            file: None,
            start_line: None,
            end_line: None,
            description: None,
        }
    }

    #[must_use]
    pub const fn external(&self) -> bool {
        matches!(self.kind, NodeKind::ExternalFunction)
    }

    #[must_use]
    pub fn location(&self) -> Option<Location> {
        let file = self.file.clone()?;
        let start_line = self.start_line?;
        Some(Location::new(file, start_line, self.end_line.unwrap_or(start_line)))
    }

    /// Every attribute except `id`, as string pairs in a fixed order.
    /// Absent optional attributes are omitted.
    #[must_use]
    pub fn attributes(&self) -> Vec<(&'static str, String)> {
        let mut attrs = vec![
            ("type", self.kind.as_str().to_string()),
            ("label", self.label.clone()),
            ("name", self.name.clone()),
            ("external", self.external().to_string()),
        ];
        let optional = [
            ("owner", self.owner.clone()),
            ("file", self.file.clone()),
            ("start_line", self.start_line.map(|l| l.to_string())),
            ("end_line", self.end_line.map(|l| l.to_string())),
            ("description", self.description.clone()),
        ];
        attrs.extend(
            optional
                .into_iter()
                .filter_map(|(key, value)| value.map(|v| (key, v))),
        );
        attrs
    }

    /// Fill absent `owner`/`description`/location. Populated fields are kept.
    fn backfill(&mut self, spec: &NodeSpec) {
        if self.owner.is_none() {
            self.owner.clone_from(&spec.owner);
        }
        if self.description.is_none() {
            self.description.clone_from(&spec.description);
        }
        if self.file.is_none() {
            if let Some(location) = &spec.location {
                self.file = Some(location.file.clone());
                self.start_line = Some(location.start_line);
                self.end_line = Some(location.end_line);
            }
        }
    }
}

impl fmt::Display for GraphNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.id)
    }
}

/// Edge in the knowledge graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GraphEdge {
    pub kind: EdgeKind,
}

impl fmt::Display for GraphEdge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.kind.as_str())
    }
}

/// Request to create or reuse a function-like node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeSpec {
    pub kind: NodeKind,
    pub qualified_name: String,
    pub name: String,
    pub owner: Option<String>,
    pub location: Option<Location>,
    pub description: Option<String>,
}

impl NodeSpec {
    /// Stub for a call target with no recorded definition.
    #[must_use]
    pub fn external(name: &str) -> Self {
        Self {
            kind: NodeKind::ExternalFunction,
            qualified_name: name.to_string(),
            name: name.to_string(),
            owner: None,
            location: None,
            description: None,
        }
    }

    fn into_node(self) -> GraphNode {
        let (file, start_line, end_line) = match self.location {
            Some(location) => (
                Some(location.file),
                Some(location.start_line),
                Some(location.end_line),
            ),
            None => (None, None, None),
        };
        GraphNode {
            id: self.kind.node_id(&self.qualified_name),
            kind: self.kind,
            label: self.qualified_name,
            name: self.name,
            owner: self.owner,
            file,
            start_line,
            end_line,
            description: self.description,
        }
    }
}

/// Typed knowledge graph.
///
/// Node creation is the single deduplication point: at most one node per
/// identity, and at most one function-like node per qualified name. Nodes
/// are never removed, so `NodeIndex` values stay valid.
#[derive(Debug, Clone, Default)]
pub struct KnowledgeGraph {
    pub(crate) graph: DiGraph<GraphNode, GraphEdge>,
    ids: HashMap<String, NodeIndex>,
    callables: HashMap<String, NodeIndex>,
}

impl KnowledgeGraph {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ensure_class(&mut self, qualified_name: &str) -> NodeIndex {
        let id = NodeKind::Class.node_id(qualified_name);
        if let Some(&idx) = self.ids.get(&id) {
            return idx;
        }
        let idx = self.graph.add_node(GraphNode::class(qualified_name));
        self.ids.insert(id, idx);
        idx
    }

    /// Create or reuse the function-like node for `spec.qualified_name`.
    ///
    /// An existing `external_function` stub met by an internal definition is
    /// promoted in place: its kind, identity and display name change, absent
    /// attributes are backfilled. An internal node is never demoted by an external request.
    pub fn ensure_callable(&mut self, spec: NodeSpec) -> NodeIndex {
        let existing = self.callables.get(&spec.qualified_name).copied();
        let Some(idx) = existing else {
            let idx = self.graph.add_node(spec.clone().into_node());
            self.ids.insert(self.graph[idx].id.clone(), idx);
            self.callables.insert(spec.qualified_name, idx);
            return idx;
        };

        let node = &mut self.graph[idx];
        if node.kind == NodeKind::ExternalFunction && spec.kind != NodeKind::ExternalFunction {
            let promoted = spec.kind.node_id(&spec.qualified_name);
            log::debug!("promoting {} to {promoted}", node.id);
            self.ids.remove(&node.id);
            node.kind = spec.kind;
            node.id.clone_from(&promoted);
            node.name.clone_from(&spec.name);
            self.ids.insert(promoted, idx);
        }
        node.backfill(&spec);
        idx
    }

    /// Insert a fully-formed node, e.g. one read back from a document.
    /// Returns the existing index when the identity is already present.
    pub fn insert_node(&mut self, node: GraphNode) -> NodeIndex {
        if let Some(&idx) = self.ids.get(&node.id) {
            return idx;
        }
        let id = node.id.clone();
        let callable = node.kind.is_function_like().then(|| node.label.clone());
        let idx = self.graph.add_node(node);
        self.ids.insert(id, idx);
        if let Some(label) = callable {
            self.callables.entry(label).or_insert(idx);
        }
        idx
    }

    /// Add an edge unless the same (kind, source, target) already exists.
    pub fn add_edge(&mut self, source: NodeIndex, target: NodeIndex, kind: EdgeKind) -> bool {
        let exists = self
            .graph
            .edges_connecting(source, target)
            .any(|edge| edge.weight().kind == kind);
        if exists {
            return false;
        }
        self.graph.add_edge(source, target, GraphEdge { kind });
        true
    }

    #[must_use]
    pub fn find_node(&self, id: &str) -> Option<NodeIndex> {
        self.ids.get(id).copied()
    }

    /// Function-like node for a qualified name, whatever its kind.
    #[must_use]
    pub fn find_callable(&self, qualified_name: &str) -> Option<NodeIndex> {
        self.callables.get(qualified_name).copied()
    }

    #[must_use]
    pub fn get_node(&self, idx: NodeIndex) -> Option<&GraphNode> {
        self.graph.node_weight(idx)
    }

    /// Nodes in creation order.
    pub fn nodes(&self) -> impl Iterator<Item = (NodeIndex, &GraphNode)> {
        self.graph
            .node_indices()
            .map(move |idx| (idx, &self.graph[idx]))
    }

    /// Edges in creation order as (source, target, kind).
    pub fn edges(&self) -> impl Iterator<Item = (&GraphNode, &GraphNode, EdgeKind)> {
        self.graph.edge_references().map(move |edge| {
            (
                &self.graph[edge.source()],
                &self.graph[edge.target()],
                edge.weight().kind,
            )
        })
    }

    #[must_use]
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    #[must_use]
    pub const fn inner(&self) -> &DiGraph<GraphNode, GraphEdge> {
        &self.graph
    }
}
