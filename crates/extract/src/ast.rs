use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Placeholder used when a scope chain yields no usable name.
pub const ANONYMOUS: &str = "<anonymous>";

/// Scope separator for qualified names.
pub const SCOPE_SEPARATOR: &str = "::";

/// Upper bound on semantic-parent hops; malformed dumps may contain cycles.
const MAX_SCOPE_DEPTH: usize = 256;

/// Node kinds the extractor distinguishes. Everything else is `Other`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CursorKind {
    TranslationUnit,
    Namespace,
    /// `class` or `struct`
    Class,
    Function,
    Method,
    Constructor,
    Destructor,
    FunctionTemplate,
    CallExpr,
    #[serde(other)]
    Other,
}

impl CursorKind {
    /// Function, method, constructor, destructor or function template.
    #[must_use]
    pub const fn is_function_like(self) -> bool {
        matches!(
            self,
            Self::Function
                | Self::Method
                | Self::Constructor
                | Self::Destructor
                | Self::FunctionTemplate
        )
    }
}

/// Declared source range of a node, as reported by the front-end.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SourceSpan {
    pub file: PathBuf,
    pub start_line: u32,
    pub end_line: u32,
}

impl SourceSpan {
    pub fn new(file: impl Into<PathBuf>, start_line: u32, end_line: u32) -> Self {
        Self {
            file: file.into(),
            start_line,
            end_line,
        }
    }
}

/// Minimal view of an AST node the extractor needs from a front-end.
///
/// Implementations return `None` (never empty strings) for absent text fields.
pub trait Cursor: Clone {
    fn kind(&self) -> CursorKind;

    fn is_definition(&self) -> bool;

    fn spelling(&self) -> Option<&str>;

    fn display_name(&self) -> Option<&str>;

    fn location(&self) -> Option<SourceSpan>;

    /// Unified symbol reference: stable identity of the underlying declaration.
    fn usr(&self) -> Option<&str>;

    fn semantic_parent(&self) -> Option<Self>;

    /// Declaration referenced by this node (call target for call expressions).
    fn referenced(&self) -> Option<Self>;

    fn brief_comment(&self) -> Option<&str> {
        None
    }

    fn raw_comment(&self) -> Option<&str> {
        None
    }

    fn children(&self) -> Vec<Self>;

    /// Position of the node in its unit, when the source has one. Traversal
    /// enters each keyed node at most once.
    fn node_key(&self) -> Option<usize> {
        None
    }
}

/// Classification the extractor dispatches on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Visit {
    ClassDef,
    FunctionDef,
    CallExpr,
    Other,
}

pub(crate) fn classify<C: Cursor>(cursor: &C) -> Visit {
    let kind = cursor.kind();
    if kind == CursorKind::CallExpr {
        return Visit::CallExpr;
    }
    if !cursor.is_definition() {
        return Visit::Other;
    }
    if kind == CursorKind::Class {
        Visit::ClassDef
    } else if kind.is_function_like() {
        Visit::FunctionDef
    } else {
        Visit::Other
    }
}

/// Scope-qualified name, outer to inner, joined with `::`.
///
/// Walks semantic parents up to (excluding) the translation unit. Unnamed
/// scopes are skipped; a chain with no names at all falls back to the
/// display name, then to `<anonymous>`.
pub fn qualified_name<C: Cursor>(cursor: &C) -> String {
    let mut names: Vec<String> = Vec::new();
    let mut current = Some(cursor.clone());
    let mut depth = 0;

    while let Some(node) = current {
        if node.kind() == CursorKind::TranslationUnit || depth >= MAX_SCOPE_DEPTH {
            break;
        }
        if let Some(name) = node.spelling().or_else(|| node.display_name()) {
            names.push(name.to_string());
        }
        current = node.semantic_parent();
        depth += 1;
    }

    if names.is_empty() {
        return cursor.display_name().unwrap_or(ANONYMOUS).to_string();
    }
    names.reverse();
    names.join(SCOPE_SEPARATOR)
}

/// Unqualified spelling with the same fallbacks as [`qualified_name`].
pub fn simple_name<C: Cursor>(cursor: &C) -> String {
    cursor
        .spelling()
        .or_else(|| cursor.display_name())
        .unwrap_or(ANONYMOUS)
        .to_string()
}
