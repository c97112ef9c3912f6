use crate::error::{GraphError, Result};
use crate::types::{EdgeKind, GraphNode, KnowledgeGraph, NodeKind};
use petgraph::graph::NodeIndex;
use petgraph::visit::EdgeRef;
use petgraph::Direction;
use serde::Serialize;
use std::collections::BTreeSet;
use std::fmt;

/// Node and edge counts by kind.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct GraphStats {
    pub nodes: usize,
    pub edges: usize,
    pub classes: usize,
    pub methods: usize,
    pub functions: usize,
    pub external_functions: usize,
    pub member_edges: usize,
    pub call_edges: usize,
}

impl fmt::Display for GraphStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} nodes ({} classes, {} methods, {} functions, {} external), {} edges ({} member, {} calls)",
            self.nodes,
            self.classes,
            self.methods,
            self.functions,
            self.external_functions,
            self.edges,
            self.member_edges,
            self.call_edges
        )
    }
}

/// `(source id, target id, kind)`
pub type EdgeTriple = (String, String, EdgeKind);

impl KnowledgeGraph {
    fn neighbors(&self, node: NodeIndex, kind: EdgeKind, direction: Direction) -> Vec<NodeIndex> {
        let mut found: Vec<NodeIndex> = self
            .graph
            .edges_directed(node, direction)
            .filter(|e| e.weight().kind == kind)
            .map(|e| match direction {
                Direction::Outgoing => e.target(),
                Direction::Incoming => e.source(),
            })
            .collect();
        found.sort_unstable();
        found
    }

    /// Find all nodes that current node calls (outgoing Calls edges)
    #[must_use]
    pub fn callees(&self, node: NodeIndex) -> Vec<NodeIndex> {
        self.neighbors(node, EdgeKind::Calls, Direction::Outgoing)
    }

    /// Find all nodes that call current node (incoming Calls edges)
    #[must_use]
    pub fn callers(&self, node: NodeIndex) -> Vec<NodeIndex> {
        self.neighbors(node, EdgeKind::Calls, Direction::Incoming)
    }

    /// Methods of a class node (outgoing Member edges)
    #[must_use]
    pub fn members(&self, class: NodeIndex) -> Vec<NodeIndex> {
        self.neighbors(class, EdgeKind::Member, Direction::Outgoing)
    }

    /// Class declaring a method node, if any
    #[must_use]
    pub fn owner(&self, method: NodeIndex) -> Option<NodeIndex> {
        self.neighbors(method, EdgeKind::Member, Direction::Incoming)
            .into_iter()
            .next()
    }

    #[must_use]
    pub fn find_by_id(&self, id: &str) -> Option<&GraphNode> {
        self.find_node(id).and_then(|idx| self.get_node(idx))
    }

    /// Like [`KnowledgeGraph::find_node`], but missing ids are an error.
    pub fn require_node(&self, id: &str) -> Result<NodeIndex> {
        self.find_node(id)
            .ok_or_else(|| GraphError::NodeNotFound(id.to_string()))
    }

    #[must_use]
    pub fn nodes_of_kind(&self, kind: NodeKind) -> Vec<NodeIndex> {
        self.graph
            .node_indices()
            .filter(|&idx| self.graph[idx].kind == kind)
            .collect()
    }

    #[must_use]
    pub fn stats(&self) -> GraphStats {
        let mut stats = GraphStats {
            nodes: self.graph.node_count(),
            edges: self.graph.edge_count(),
            ..GraphStats::default()
        };
        for node in self.graph.node_weights() {
            match node.kind {
                NodeKind::Class => stats.classes += 1,
                NodeKind::Method => stats.methods += 1,
                NodeKind::Function => stats.functions += 1,
                NodeKind::ExternalFunction => stats.external_functions += 1,
            }
        }
        for edge in self.graph.edge_weights() {
            match edge.kind {
                EdgeKind::Member => stats.member_edges += 1,
                EdgeKind::Calls => stats.call_edges += 1,
            }
        }
        stats
    }

    /// Node identities, sorted.
    #[must_use]
    pub fn node_ids(&self) -> BTreeSet<String> {
        self.graph.node_weights().map(|n| n.id.clone()).collect()
    }

    /// Edges by endpoint identity and kind, sorted.
    #[must_use]
    pub fn edge_triples(&self) -> BTreeSet<EdgeTriple> {
        self.edges()
            .map(|(source, target, kind)| (source.id.clone(), target.id.clone(), kind))
            .collect()
    }

    /// Same node set by identity and same edge set by (source, target, kind).
    #[must_use]
    pub fn same_shape(&self, other: &Self) -> bool {
        self.node_ids() == other.node_ids() && self.edge_triples() == other.edge_triples()
    }
}
