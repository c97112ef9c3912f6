use crate::types::{EdgeKind, KnowledgeGraph, NodeKind, NodeSpec};
use kgraph_extract::{Analysis, Extraction, Symbol, SymbolId, SymbolRegistry};
use petgraph::graph::NodeIndex;
use std::collections::{BTreeMap, BTreeSet, HashMap};

/// Build the knowledge graph from extracted classes, free functions and the
/// registry holding their symbols.
///
/// Every internal node exists before any call is resolved, so an
/// external-looking call whose name matches a recorded definition reuses
/// that node.
#[must_use]
pub fn assemble(
    classes: &BTreeMap<String, BTreeSet<SymbolId>>,
    free_functions: &BTreeSet<SymbolId>,
    registry: &SymbolRegistry,
) -> KnowledgeGraph {
    let mut graph = KnowledgeGraph::new();
    let mut by_symbol: HashMap<&SymbolId, NodeIndex> = HashMap::new();
    let mut callers: Vec<(&Symbol, NodeIndex)> = Vec::new();

    // Phase 1: classes, their methods and member edges
    for (class, methods) in classes {
        let class_idx = graph.ensure_class(class);
        let mut methods = resolve(methods, registry);
        methods.sort_by(|a, b| {
            a.simple_name
                .cmp(&b.simple_name)
                .then_with(|| a.id.cmp(&b.id))
        });

        for method in methods {
            let owner = method.owner.clone().or_else(|| Some(class.clone()));
            let idx = graph.ensure_callable(spec_for(method, NodeKind::Method, owner));
            graph.add_edge(class_idx, idx, EdgeKind::Member);
            by_symbol.insert(&method.id, idx);
            callers.push((method, idx));
        }
    }

    // Phase 2: free functions
    let mut functions = resolve(free_functions, registry);
    functions.sort_by(|a, b| {
        a.qualified_name
            .cmp(&b.qualified_name)
            .then_with(|| a.id.cmp(&b.id))
    });
    for function in functions {
        let idx = graph.ensure_callable(spec_for(function, NodeKind::Function, None));
        by_symbol.insert(&function.id, idx);
        callers.push((function, idx));
    }

    // Phase 3: call edges, methods first, then free functions
    for (caller, caller_idx) in callers {
        for call in caller.sorted_calls() {
            let known = call.callee.as_ref().and_then(|id| by_symbol.get(id)).copied();
            let callee_idx = match known {
                Some(idx) => idx,
                None => graph.ensure_callable(NodeSpec::external(&call.name)),
            };
            graph.add_edge(caller_idx, callee_idx, EdgeKind::Calls);
        }
    }

    log::info!(
        "Built knowledge graph: {} nodes, {} edges",
        graph.node_count(),
        graph.edge_count()
    );
    graph
}

#[must_use]
pub fn assemble_extraction(extraction: &Extraction) -> KnowledgeGraph {
    assemble(
        &extraction.classes,
        &extraction.free_functions,
        &extraction.registry,
    )
}

/// Assemble from the interchange record.
#[must_use]
pub fn assemble_analysis(analysis: &Analysis) -> KnowledgeGraph {
    assemble_extraction(&analysis.into_extraction())
}

fn resolve<'r>(ids: &BTreeSet<SymbolId>, registry: &'r SymbolRegistry) -> Vec<&'r Symbol> {
    ids.iter()
        .filter_map(|id| {
            let symbol = registry.get(id);
            if symbol.is_none() {
                log::debug!("skipping {id}: not in registry");
            }
            symbol
        })
        .collect()
}

fn spec_for(symbol: &Symbol, kind: NodeKind, owner: Option<String>) -> NodeSpec {
    NodeSpec {
        kind,
        qualified_name: symbol.qualified_name.clone(),
        name: symbol.simple_name.clone(),
        owner,
        location: Some(symbol.location.clone()),
        description: symbol.description.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kgraph_extract::{CallRef, Location, SymbolFacts};
    use pretty_assertions::assert_eq;

    fn register(
        registry: &mut SymbolRegistry,
        id: &str,
        qualified: &str,
        owner: Option<&str>,
    ) -> SymbolId {
        let simple = qualified.rsplit("::").next().unwrap_or(qualified);
        registry.register_or_update(
            SymbolId::new(id),
            SymbolFacts {
                qualified_name: qualified.into(),
                simple_name: simple.into(),
                location: Location::new("src/a.cpp", 1, 2),
                owner: owner.map(str::to_string),
                description: None,
            },
        )
    }

    #[test]
    fn unresolved_call_reuses_definition_with_same_name() {
        let mut registry = SymbolRegistry::new();
        let mut classes = BTreeMap::new();
        let add = register(&mut registry, "add", "Calc::add", Some("Calc"));
        classes.insert("Calc".to_string(), BTreeSet::from([add.clone()]));
        // `helper` is called by name before its definition is ever seen as a node.
        registry.record_call(&add, CallRef::unresolved("helper"));
        let helper = register(&mut registry, "helper", "helper", None);

        let graph = assemble(&classes, &BTreeSet::from([helper]), &registry);
        assert!(graph.nodes_of_kind(NodeKind::ExternalFunction).is_empty());
        assert!(graph.edge_triples().contains(&(
            "method::Calc::add".to_string(),
            "function::helper".to_string(),
            EdgeKind::Calls
        )));
    }

    #[test]
    fn symbols_missing_from_registry_are_skipped() {
        let registry = SymbolRegistry::new();
        let classes =
            BTreeMap::from([("Calc".to_string(), BTreeSet::from([SymbolId::new("gone")]))]);

        let graph = assemble(&classes, &BTreeSet::new(), &registry);
        assert_eq!(graph.node_count(), 1);
        assert_eq!(graph.edge_count(), 0);
    }
}
