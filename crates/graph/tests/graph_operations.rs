//! Tests for KnowledgeGraph operations

use kgraph_extract::Location;
use kgraph_graph::{EdgeKind, KnowledgeGraph, NodeKind, NodeSpec};
use pretty_assertions::assert_eq;

fn function(qualified: &str, file: &str) -> NodeSpec {
    NodeSpec {
        kind: NodeKind::Function,
        qualified_name: qualified.to_string(),
        name: qualified.rsplit("::").next().unwrap_or(qualified).to_string(),
        owner: None,
        location: Some(Location::new(file, 1, 10)),
        description: None,
    }
}

fn method(class: &str, name: &str) -> NodeSpec {
    NodeSpec {
        kind: NodeKind::Method,
        qualified_name: format!("{class}::{name}"),
        name: name.to_string(),
        owner: Some(class.to_string()),
        location: Some(Location::new("src/class.cpp", 1, 10)),
        description: None,
    }
}

#[test]
fn test_add_node_and_find() {
    let mut graph = KnowledgeGraph::new();

    let idx = graph.ensure_callable(function("foo", "src/lib.cpp"));

    assert_eq!(graph.find_node("function::foo"), Some(idx));
    assert_eq!(graph.find_callable("foo"), Some(idx));
    assert!(graph.find_node("function::bar").is_none());
    assert_eq!(graph.find_by_id("function::foo").unwrap().label, "foo");
}

#[test]
fn test_node_count() {
    let mut graph = KnowledgeGraph::new();

    assert_eq!(graph.node_count(), 0);
    assert!(graph.is_empty());

    graph.ensure_callable(function("foo", "src/lib.cpp"));
    assert_eq!(graph.node_count(), 1);

    graph.ensure_callable(function("bar", "src/lib.cpp"));
    assert_eq!(graph.node_count(), 2);

    // Same qualified name: reused
    graph.ensure_callable(function("bar", "src/other.cpp"));
    assert_eq!(graph.node_count(), 2);
}

#[test]
fn test_edge_count() {
    let mut graph = KnowledgeGraph::new();

    let n1 = graph.ensure_callable(function("foo", "src/lib.cpp"));
    let n2 = graph.ensure_callable(function("bar", "src/lib.cpp"));

    assert_eq!(graph.edge_count(), 0);

    assert!(graph.add_edge(n1, n2, EdgeKind::Calls));
    assert!(!graph.add_edge(n1, n2, EdgeKind::Calls));
    assert_eq!(graph.edge_count(), 1);
}

#[test]
fn test_callees() {
    let mut graph = KnowledgeGraph::new();

    let n_main = graph.ensure_callable(function("main", "src/main.cpp"));
    let n_helper = graph.ensure_callable(function("helper", "src/lib.cpp"));
    let n_log = graph.ensure_callable(NodeSpec::external("log"));

    // main calls helper and log
    graph.add_edge(n_main, n_helper, EdgeKind::Calls);
    graph.add_edge(n_main, n_log, EdgeKind::Calls);

    assert_eq!(graph.callees(n_main), vec![n_helper, n_log]);

    // helper has no callees
    assert!(graph.callees(n_helper).is_empty());
}

#[test]
fn test_callers() {
    let mut graph = KnowledgeGraph::new();

    let n_main = graph.ensure_callable(function("main", "src/main.cpp"));
    let n_run = graph.ensure_callable(function("run", "src/lib.cpp"));
    let n_helper = graph.ensure_callable(function("helper", "src/lib.cpp"));

    // main -> helper, run -> helper
    graph.add_edge(n_main, n_helper, EdgeKind::Calls);
    graph.add_edge(n_run, n_helper, EdgeKind::Calls);

    assert_eq!(graph.callers(n_helper), vec![n_main, n_run]);

    // main has no callers
    assert!(graph.callers(n_main).is_empty());
}

#[test]
fn test_members_and_owner() {
    let mut graph = KnowledgeGraph::new();

    let n_class = graph.ensure_class("Calc");
    let n_add = graph.ensure_callable(method("Calc", "add"));
    let n_sub = graph.ensure_callable(method("Calc", "sub"));
    let n_free = graph.ensure_callable(function("clamp", "src/util.cpp"));

    graph.add_edge(n_class, n_add, EdgeKind::Member);
    graph.add_edge(n_class, n_sub, EdgeKind::Member);
    graph.add_edge(n_add, n_free, EdgeKind::Calls);

    assert_eq!(graph.members(n_class), vec![n_add, n_sub]);
    assert_eq!(graph.owner(n_add), Some(n_class));
    assert_eq!(graph.owner(n_free), None);
    // Calls edges are not membership
    assert!(graph.members(n_add).is_empty());
}

#[test]
fn test_nodes_of_kind() {
    let mut graph = KnowledgeGraph::new();

    let n_class = graph.ensure_class("Calc");
    let n_add = graph.ensure_callable(method("Calc", "add"));
    let n_max = graph.ensure_callable(NodeSpec::external("std::max"));

    assert_eq!(graph.nodes_of_kind(NodeKind::Class), vec![n_class]);
    assert_eq!(graph.nodes_of_kind(NodeKind::Method), vec![n_add]);
    assert_eq!(graph.nodes_of_kind(NodeKind::ExternalFunction), vec![n_max]);
    assert!(graph.nodes_of_kind(NodeKind::Function).is_empty());
}

#[test]
fn test_require_unknown_node() {
    let graph = KnowledgeGraph::new();

    let result = graph.require_node("function::unknown");
    assert!(result.is_err());
}

#[test]
fn test_edge_kinds_between_same_pair() {
    let mut graph = KnowledgeGraph::new();

    let n_class = graph.ensure_class("Calc");
    let n_add = graph.ensure_callable(method("Calc", "add"));

    graph.add_edge(n_class, n_add, EdgeKind::Member);
    graph.add_edge(n_class, n_add, EdgeKind::Calls);

    assert_eq!(graph.edge_count(), 2);
    assert_eq!(graph.members(n_class), vec![n_add]);
    assert_eq!(graph.callees(n_class), vec![n_add]);
    assert_eq!(graph.stats().member_edges, 1);
    assert_eq!(graph.stats().call_edges, 1);
}
