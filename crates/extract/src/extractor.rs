use crate::ast::{classify, qualified_name, simple_name, Cursor, CursorKind, Visit};
use crate::ast_dump::AstDump;
use crate::comment::description_of;
use crate::registry::{CallRef, Location, Symbol, SymbolFacts, SymbolId, SymbolRegistry};
use crate::scope::{relative_to_project, InScope};
use rayon::prelude::*;
use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::path::{Path, PathBuf};

/// Name recorded for a call whose target has no usable spelling.
pub const UNKNOWN_CALLEE: &str = "<unknown>";

/// Everything extracted from one or more translation units.
#[derive(Debug, Clone, Default)]
pub struct Extraction {
    /// Class qualified name -> identities of its methods.
    pub classes: BTreeMap<String, BTreeSet<SymbolId>>,
    pub free_functions: BTreeSet<SymbolId>,
    pub registry: SymbolRegistry,
    /// Set when any contributing unit had error diagnostics.
    pub best_effort: bool,
}

impl Extraction {
    /// Fold `other` into `self`, applying the registry's first-write-wins
    /// rules. Callers merging several units must do so in a stable order.
    pub fn merge(&mut self, other: Self) {
        self.registry.absorb(other.registry);
        for (class, methods) in other.classes {
            self.classes.entry(class).or_default().extend(methods);
        }
        self.free_functions.extend(other.free_functions);
        self.best_effort |= other.best_effort;
    }

    /// Registered methods of `class`, ordered by simple name then identity.
    #[must_use]
    pub fn methods_of(&self, class: &str) -> Vec<&Symbol> {
        let mut methods: Vec<&Symbol> = self
            .classes
            .get(class)
            .into_iter()
            .flatten()
            .filter_map(|id| self.registry.get(id))
            .collect();
        methods.sort_by(|a, b| {
            a.simple_name
                .cmp(&b.simple_name)
                .then_with(|| a.id.cmp(&b.id))
        });
        methods
    }

    /// Registered free functions, ordered by qualified name then identity.
    #[must_use]
    pub fn sorted_free_functions(&self) -> Vec<&Symbol> {
        let mut functions: Vec<&Symbol> = self
            .free_functions
            .iter()
            .filter_map(|id| self.registry.get(id))
            .collect();
        functions.sort_by(|a, b| {
            a.qualified_name
                .cmp(&b.qualified_name)
                .then_with(|| a.id.cmp(&b.id))
        });
        functions
    }
}

/// Pre-order traversal that records classes, function definitions and the
/// calls made from inside them.
///
/// The only context is the identity of the innermost enclosing function
/// definition. It travels with each pending node on the worklist, so leaving
/// a function body restores the outer context without any bookkeeping.
pub struct CallGraphExtractor<'s, S: ?Sized> {
    scope: &'s S,
    project_root: PathBuf,
    out: Extraction,
}

impl<'s, S: InScope + ?Sized> CallGraphExtractor<'s, S> {
    pub fn new(project_root: impl Into<PathBuf>, scope: &'s S) -> Self {
        Self {
            scope,
            project_root: project_root.into(),
            out: Extraction::default(),
        }
    }

    pub fn mark_best_effort(&mut self) {
        self.out.best_effort = true;
    }

    /// Walk the tree under `root`. May be called once per unit.
    pub fn visit<C: Cursor>(&mut self, root: C) {
        let mut pending: Vec<(C, Option<SymbolId>)> = vec![(root, None)];
        let mut seen: HashSet<usize> = HashSet::new();

        while let Some((cursor, current)) = pending.pop() {
            if let Some(key) = cursor.node_key() {
                if !seen.insert(key) {
                    log::debug!("node {key} reached twice; skipping");
                    continue;
                }
            }
            let context = match classify(&cursor) {
                Visit::ClassDef => {
                    if self.in_scope(&cursor) {
                        self.out.classes.entry(qualified_name(&cursor)).or_default();
                    }
                    current
                }
                Visit::FunctionDef if self.in_scope(&cursor) => {
                    self.enter_function(&cursor).or(current)
                }
                Visit::FunctionDef | Visit::Other => current,
                Visit::CallExpr => {
                    if let Some(caller) = current.as_ref() {
                        self.record_call(caller, &cursor);
                    }
                    current
                }
            };

            // Reversed so siblings pop in source order.
            for child in cursor.children().into_iter().rev() {
                pending.push((child, context.clone()));
            }
        }
    }

    #[must_use]
    pub fn finish(self) -> Extraction {
        self.out
    }

    fn in_scope<C: Cursor>(&self, cursor: &C) -> bool {
        cursor
            .location()
            .is_some_and(|span| self.scope.contains(&span))
    }

    fn enter_function<C: Cursor>(&mut self, cursor: &C) -> Option<SymbolId> {
        let id = self.register_function(cursor)?;
        match owning_class(cursor) {
            Some(class) => {
                self.out.classes.entry(class).or_default().insert(id.clone());
            }
            None => {
                self.out.free_functions.insert(id.clone());
            }
        }
        Some(id)
    }

    /// `None` when the definition has no usable location.
    fn register_function<C: Cursor>(&mut self, cursor: &C) -> Option<SymbolId> {
        let span = cursor.location()?;
        let qualified = qualified_name(cursor);
        let location = Location {
            file: relative_to_project(&span.file, &self.project_root),
            start_line: span.start_line,
            end_line: span.end_line,
        };
        let id = match cursor.usr() {
            Some(usr) => SymbolId::new(usr),
            None => {
                log::debug!("no USR for {qualified}; using location-based identity");
                SymbolId::fallback(&qualified, &location)
            }
        };

        let facts = SymbolFacts {
            simple_name: simple_name(cursor),
            qualified_name: qualified,
            location,
            owner: owning_class(cursor),
            description: description_of(cursor),
        };
        Some(self.out.registry.register_or_update(id, facts))
    }

    fn record_call<C: Cursor>(&mut self, caller: &SymbolId, cursor: &C) {
        if !self.out.registry.contains(caller) || !self.in_scope(cursor) {
            return;
        }

        let call = match cursor.referenced() {
            Some(target) => CallRef {
                callee: target.usr().map(SymbolId::new),
                name: qualified_name(&target),
            },
            None => CallRef::unresolved(
                cursor
                    .display_name()
                    .or_else(|| cursor.spelling())
                    .unwrap_or(UNKNOWN_CALLEE),
            ),
        };
        if call.name.is_empty() {
            return;
        }
        self.out.registry.record_call(caller, call);
    }
}

/// Qualified name of the named class a method is declared in.
fn owning_class<C: Cursor>(cursor: &C) -> Option<String> {
    let parent = cursor.semantic_parent()?;
    if parent.kind() == CursorKind::Class && parent.spelling().is_some() {
        Some(qualified_name(&parent))
    } else {
        None
    }
}

/// Extract a single unit into a fresh [`Extraction`].
pub fn extract_unit<S: InScope + ?Sized>(dump: &AstDump, project_root: &Path, scope: &S) -> Extraction {
    let mut extractor = CallGraphExtractor::new(project_root, scope);
    if dump.has_errors() {
        for diag in &dump.diagnostics {
            log::warn!("{}: {:?}: {}", dump.unit.display(), diag.severity, diag.message);
        }
        log::warn!(
            "{}: parse errors reported; results are best-effort",
            dump.unit.display()
        );
        extractor.mark_best_effort();
    }
    match dump.root() {
        Some(root) => extractor.visit(root),
        None => log::warn!(
            "{}: root node {} is out of range; unit skipped",
            dump.unit.display(),
            dump.root
        ),
    }
    extractor.finish()
}

/// Extract units in parallel into local results, then merge them in
/// ascending unit-path order.
pub fn extract_units<S: InScope + Sync + ?Sized>(
    dumps: &[AstDump],
    project_root: &Path,
    scope: &S,
) -> Extraction {
    let mut locals: Vec<(&Path, Extraction)> = dumps
        .par_iter()
        .map(|dump| (dump.unit.as_path(), extract_unit(dump, project_root, scope)))
        .collect();
    locals.sort_by(|a, b| a.0.cmp(b.0));

    let mut merged = Extraction::default();
    for (unit, local) in locals {
        log::debug!(
            "merging {}: {} symbols",
            unit.display(),
            local.registry.len()
        );
        merged.merge(local);
    }

    log::info!(
        "Extracted {} symbols, {} classes, {} free functions from {} units",
        merged.registry.len(),
        merged.classes.len(),
        merged.free_functions.len(),
        dumps.len()
    );
    merged
}
