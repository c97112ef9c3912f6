use kgraph_extract::{Analysis, CallRef, Extraction, Location, SymbolFacts, SymbolId};
use kgraph_graph::{assemble_analysis, assemble_extraction, KnowledgeGraph};
use proptest::prelude::*;
use std::collections::BTreeSet;

/// Definitions are `(name, is_method, line)`; calls are
/// `(caller index, target name, resolved)`.
fn build(defs: &[(String, bool, u32)], calls: &[(usize, String, bool)]) -> Extraction {
    let mut extraction = Extraction::default();
    let mut registered: Vec<(SymbolId, String)> = Vec::new();

    for (i, (name, is_method, line)) in defs.iter().enumerate() {
        let qualified = if *is_method {
            format!("K::{name}")
        } else {
            name.clone()
        };
        let id = extraction.registry.register_or_update(
            SymbolId::new(format!("usr:{i}")),
            SymbolFacts {
                qualified_name: qualified.clone(),
                simple_name: name.clone(),
                location: Location::new("src/k.cpp", *line, *line + 1),
                owner: is_method.then(|| "K".to_string()),
                description: None,
            },
        );
        if *is_method {
            extraction
                .classes
                .entry("K".to_string())
                .or_default()
                .insert(id.clone());
        } else {
            extraction.free_functions.insert(id.clone());
        }
        registered.push((id, qualified));
    }

    for (caller, target, resolved) in calls {
        let (caller, _) = &registered[caller % registered.len()];
        let call = if *resolved {
            let callee = registered
                .iter()
                .find(|(_, qualified)| qualified == target)
                .map_or_else(|| SymbolId::new(format!("ext:{target}")), |(id, _)| id.clone());
            CallRef::resolved(callee, target.clone())
        } else {
            CallRef::unresolved(target.clone())
        };
        extraction.registry.record_call(caller, call);
    }
    extraction
}

fn extraction_strategy() -> impl Strategy<Value = Extraction> {
    (
        prop::collection::vec(("[a-d]", any::<bool>(), 1u32..5), 1..8),
        prop::collection::vec((0usize..8, "[a-f]", any::<bool>()), 0..24),
    )
        .prop_map(|(defs, calls)| build(&defs, &calls))
}

fn function_like_labels_are_unique(graph: &KnowledgeGraph) -> bool {
    let labels: Vec<&str> = graph
        .nodes()
        .filter(|(_, node)| node.kind.is_function_like())
        .map(|(_, node)| node.label.as_str())
        .collect();
    let distinct: BTreeSet<&str> = labels.iter().copied().collect();
    distinct.len() == labels.len()
}

proptest! {
    #[test]
    fn no_duplicate_nodes_or_edges(extraction in extraction_strategy()) {
        let graph = assemble_extraction(&extraction);
        prop_assert_eq!(graph.node_count(), graph.node_ids().len());
        prop_assert_eq!(graph.edge_count(), graph.edge_triples().len());
        prop_assert!(function_like_labels_are_unique(&graph));
    }

    #[test]
    fn every_method_has_exactly_one_owner(extraction in extraction_strategy()) {
        let graph = assemble_extraction(&extraction);
        for idx in graph.nodes_of_kind(kgraph_graph::NodeKind::Method) {
            let owners: Vec<_> = graph
                .inner()
                .neighbors_directed(idx, petgraph::Direction::Incoming)
                .filter(|&n| graph.members(n).contains(&idx))
                .collect();
            prop_assert_eq!(owners.len(), 1);
        }
    }

    #[test]
    fn interchange_round_trip_preserves_shape(extraction in extraction_strategy()) {
        let direct = assemble_extraction(&extraction);

        let json = serde_json::to_string(&Analysis::from_extraction("/p", &extraction)).unwrap();
        let analysis: Analysis = serde_json::from_str(&json).unwrap();
        let reread = assemble_analysis(&analysis);

        prop_assert_eq!(direct.node_ids(), reread.node_ids());
        prop_assert_eq!(direct.edge_triples(), reread.edge_triples());
    }
}
