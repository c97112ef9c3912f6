//! # Knowledge Graph
//!
//! Typed knowledge graph of classes, methods, functions and external call
//! targets, assembled from extracted call facts.
//!
//! ## Features
//!
//! - **Deterministic assembly** - one node per (kind, qualified name), no multi-edges
//! - **Structural queries** - callers, callees, class members, owners
//! - **Export formats** - node-link JSON, GraphML, GEXF, Graphviz
//! - **Database export** - property-graph stores via [`GraphStore`]
//!
//! ## Architecture
//!
//! ```text
//! Extraction / Analysis
//!     │
//!     ├──> Assembler
//!     │      ├─ class nodes + member edges
//!     │      ├─ method / function nodes
//!     │      └─ calls edges (external stubs by name)
//!     │
//!     ├──> KnowledgeGraph (petgraph)
//!     │      ├─ Nodes: class, method, function, external_function
//!     │      └─ Edges: member, calls
//!     │
//!     └──> Outputs
//!            ├─ write_graph (json / graphml / gexf / dot)
//!            ├─ export_graph -> GraphStore (Cypher script)
//!            └─ render_dot
//! ```

mod assembler;
mod error;
mod format;
mod graph;
mod node_link;
mod render;
mod store;
mod types;
mod xml;

pub use assembler::{assemble, assemble_analysis, assemble_extraction};
pub use error::{GraphError, Result};
pub use format::{default_output_path, render_document, write_graph, GraphFormat};
pub use graph::{EdgeTriple, GraphStats};
pub use node_link::{from_node_link, read_node_link, to_node_link};
pub use render::{
    edge_color, node_color, render_dot, tag_color, to_dot, CLASS_COLOR, EXTERNAL_FUNCTION_COLOR,
    FUNCTION_COLOR, MEMBER_EDGE_COLOR, METHOD_COLOR, OTHER_EDGE_COLOR, UNKNOWN_COLOR,
};
pub use store::{export_graph, CypherScript, ExportStats, GraphStore};
pub use types::{EdgeKind, GraphEdge, GraphNode, KnowledgeGraph, NodeKind, NodeSpec};
