//! Export to a property-graph database.
//!
//! The database side owns create-or-merge semantics; clearing an existing
//! graph first is the caller's choice.

use crate::error::{GraphError, Result};
use crate::types::KnowledgeGraph;
use serde::Serialize;
use std::fmt::Write as _;
use std::path::Path;
use std::time::Instant;

/// Sink for nodes and relationships.
pub trait GraphStore {
    /// Remove every existing node and relationship.
    fn clear(&mut self) -> Result<()>;

    /// `properties` always includes `id`.
    fn create_node(&mut self, label: &str, properties: &[(&str, String)]) -> Result<()>;

    fn create_relationship(
        &mut self,
        rel_type: &str,
        source_id: &str,
        target_id: &str,
    ) -> Result<()>;
}

/// Statistics from an export run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ExportStats {
    /// Whether the store was cleared first
    pub cleared: bool,
    /// Number of nodes created
    pub nodes_created: usize,
    /// Number of relationships created
    pub relationships_created: usize,
    /// Export duration in milliseconds
    pub duration_ms: u64,
}

/// Emit one node per graph node (label = type tag) and one relationship per
/// edge (type = upper-cased tag). Any store failure is reported as
/// [`GraphError::ExportError`]; the graph itself is never modified.
pub fn export_graph<S: GraphStore + ?Sized>(
    graph: &KnowledgeGraph,
    store: &mut S,
    clear_existing: bool,
) -> Result<ExportStats> {
    let start = Instant::now();
    let mut stats = ExportStats::default();

    if clear_existing {
        log::info!("Clearing existing graph data");
        store.clear().map_err(export_failure)?;
        stats.cleared = true;
    }

    for (_, node) in graph.nodes() {
        let mut properties: Vec<(&str, String)> = node
            .attributes()
            .into_iter()
            .filter(|(key, _)| *key != "type")
            .collect();
        properties.push(("id", node.id.clone()));
        store
            .create_node(node.kind.as_str(), &properties)
            .map_err(export_failure)?;
        stats.nodes_created += 1;
    }

    for (source, target, kind) in graph.edges() {
        store
            .create_relationship(&kind.relationship_type(), &source.id, &target.id)
            .map_err(export_failure)?;
        stats.relationships_created += 1;
    }

    stats.duration_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);
    log::info!(
        "Exported {} nodes and {} relationships in {}ms",
        stats.nodes_created,
        stats.relationships_created,
        stats.duration_ms
    );
    Ok(stats)
}

fn export_failure(err: GraphError) -> GraphError {
    match err {
        GraphError::ExportError(_) => err,
        other => GraphError::ExportError(other.to_string()),
    }
}

/// Store that renders Cypher statements, one per line, for `cypher-shell`.
#[derive(Debug, Clone, Default)]
pub struct CypherScript {
    statements: Vec<String>,
}

impl CypherScript {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn statements(&self) -> &[String] {
        &self.statements
    }

    #[must_use]
    pub fn to_script(&self) -> String {
        let mut script = String::new();
        for statement in &self.statements {
            let _ = writeln!(script, "{statement};");
        }
        script
    }

    pub fn write_to(&self, path: &Path) -> Result<()> {
        let write = || -> std::io::Result<()> {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(path, self.to_script())
        };
        write().map_err(|e| GraphError::ExportError(format!("{}: {e}", path.display())))?;
        log::info!(
            "Cypher script written to {} ({} statements)",
            path.display(),
            self.statements.len()
        );
        Ok(())
    }
}

impl GraphStore for CypherScript {
    fn clear(&mut self) -> Result<()> {
        self.statements.push("MATCH (n) DETACH DELETE n".to_string());
        Ok(())
    }

    fn create_node(&mut self, label: &str, properties: &[(&str, String)]) -> Result<()> {
        let properties = properties
            .iter()
            .map(|(key, value)| format!("{}: {}", identifier(key), string_literal(value)))
            .collect::<Vec<_>>()
            .join(", ");
        self.statements
            .push(format!("CREATE (n:{} {{{properties}}})", identifier(label)));
        Ok(())
    }

    fn create_relationship(
        &mut self,
        rel_type: &str,
        source_id: &str,
        target_id: &str,
    ) -> Result<()> {
        self.statements.push(format!(
            "MATCH (a {{id: {}}}), (b {{id: {}}}) CREATE (a)-[:{}]->(b)",
            string_literal(source_id),
            string_literal(target_id),
            identifier(rel_type)
        ));
        Ok(())
    }
}

/// Plain identifiers pass through; anything else is backtick-quoted.
fn identifier(name: &str) -> String {
    let plain = name
        .chars()
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
    if plain {
        name.to_string()
    } else {
        format!("`{}`", name.replace('`', "``"))
    }
}

fn string_literal(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('\'');
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\'' => out.push_str("\\'"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c => out.push(c),
        }
    }
    out.push('\'');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{EdgeKind, NodeKind, NodeSpec};
    use pretty_assertions::assert_eq;

    fn sample() -> KnowledgeGraph {
        let mut graph = KnowledgeGraph::new();
        let class = graph.ensure_class("Calc");
        let add = graph.ensure_callable(NodeSpec {
            kind: NodeKind::Method,
            qualified_name: "Calc::add".into(),
            name: "add".into(),
            owner: Some("Calc".into()),
            location: None,
            description: Some("Adds 'two' values".into()),
        });
        graph.add_edge(class, add, EdgeKind::Member);
        graph
    }

    #[test]
    fn script_escapes_values_and_orders_statements() {
        let mut script = CypherScript::new();
        let stats = export_graph(&sample(), &mut script, true).unwrap();

        assert_eq!(stats.nodes_created, 2);
        assert_eq!(stats.relationships_created, 1);
        assert!(stats.cleared);
        let statements = script.statements();
        assert_eq!(statements[0], "MATCH (n) DETACH DELETE n");
        assert_eq!(
            statements[1],
            "CREATE (n:class {label: 'Calc', name: 'Calc', external: 'false', id: 'class::Calc'})"
        );
        assert!(statements[2].contains(r"description: 'Adds \'two\' values'"));
        assert_eq!(
            statements[3],
            "MATCH (a {id: 'class::Calc'}), (b {id: 'method::Calc::add'}) CREATE (a)-[:MEMBER]->(b)"
        );
    }

    struct Unreachable;

    impl GraphStore for Unreachable {
        fn clear(&mut self) -> Result<()> {
            Ok(())
        }

        fn create_node(&mut self, _: &str, _: &[(&str, String)]) -> Result<()> {
            Err(GraphError::IoError(std::io::Error::new(
                std::io::ErrorKind::ConnectionRefused,
                "connection refused",
            )))
        }

        fn create_relationship(&mut self, _: &str, _: &str, _: &str) -> Result<()> {
            Ok(())
        }
    }

    #[test]
    fn store_failure_is_export_error_and_graph_is_untouched() {
        let graph = sample();
        let err = export_graph(&graph, &mut Unreachable, false).unwrap_err();
        assert!(matches!(err, GraphError::ExportError(msg) if msg.contains("connection refused")));
        assert_eq!(graph.node_count(), 2);
        assert_eq!(graph.edge_count(), 1);
    }

    #[test]
    fn odd_identifiers_are_quoted() {
        assert_eq!(identifier("external_function"), "external_function");
        assert_eq!(identifier("has space"), "`has space`");
        assert_eq!(identifier("9lives"), "`9lives`");
    }
}
