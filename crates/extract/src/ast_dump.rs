use crate::ast::{Cursor, CursorKind, SourceSpan};
use crate::error::{ExtractError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// File suffix front-ends use for per-unit dumps.
pub const AST_DUMP_SUFFIX: &str = ".ast.json";

/// Index of a node inside [`AstDump::nodes`].
pub type NodeId = usize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Ignored,
    Note,
    Warning,
    Error,
    Fatal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub severity: Severity,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line: Option<u32>,
}

/// One node of a dumped translation unit. Links are indices into the same dump.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DumpNode {
    pub kind: CursorKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spelling: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usr: Option<String>,
    #[serde(default)]
    pub is_definition: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_line: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_line: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub semantic_parent: Option<NodeId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub referenced: Option<NodeId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brief_comment: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw_comment: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<NodeId>,
}

impl DumpNode {
    #[must_use]
    pub fn new(kind: CursorKind) -> Self {
        Self {
            kind,
            spelling: None,
            display_name: None,
            usr: None,
            is_definition: false,
            file: None,
            start_line: None,
            end_line: None,
            semantic_parent: None,
            referenced: None,
            brief_comment: None,
            raw_comment: None,
            children: Vec::new(),
        }
    }

    #[must_use]
    pub fn spelling(mut self, spelling: impl Into<String>) -> Self {
        self.spelling = Some(spelling.into());
        self
    }

    #[must_use]
    pub fn display_name(mut self, display_name: impl Into<String>) -> Self {
        self.display_name = Some(display_name.into());
        self
    }

    #[must_use]
    pub fn usr(mut self, usr: impl Into<String>) -> Self {
        self.usr = Some(usr.into());
        self
    }

    #[must_use]
    pub const fn definition(mut self) -> Self {
        self.is_definition = true;
        self
    }

    #[must_use]
    pub fn span(mut self, file: impl Into<PathBuf>, start_line: u32, end_line: u32) -> Self {
        self.file = Some(file.into());
        self.start_line = Some(start_line);
        self.end_line = Some(end_line);
        self
    }

    #[must_use]
    pub const fn parent(mut self, parent: NodeId) -> Self {
        self.semantic_parent = Some(parent);
        self
    }

    #[must_use]
    pub const fn references(mut self, target: NodeId) -> Self {
        self.referenced = Some(target);
        self
    }

    #[must_use]
    pub fn brief_comment(mut self, comment: impl Into<String>) -> Self {
        self.brief_comment = Some(comment.into());
        self
    }

    #[must_use]
    pub fn raw_comment(mut self, comment: impl Into<String>) -> Self {
        self.raw_comment = Some(comment.into());
        self
    }
}

/// Arena form of one parsed translation unit, as written by a front-end.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AstDump {
    /// Source file the unit was parsed from.
    pub unit: PathBuf,
    #[serde(default)]
    pub diagnostics: Vec<Diagnostic>,
    #[serde(default)]
    pub root: NodeId,
    pub nodes: Vec<DumpNode>,
}

impl AstDump {
    /// Empty unit containing only its translation-unit root.
    pub fn new(unit: impl Into<PathBuf>) -> Self {
        let unit = unit.into();
        let root = DumpNode::new(CursorKind::TranslationUnit)
            .spelling(unit.to_string_lossy().into_owned());
        Self {
            unit,
            diagnostics: Vec::new(),
            root: 0,
            nodes: vec![root],
        }
    }

    /// Append `node` as the last child of `parent` (structural, not semantic).
    pub fn add_child(&mut self, parent: NodeId, node: DumpNode) -> NodeId {
        let id = self.nodes.len();
        self.nodes.push(node);
        if let Some(parent) = self.nodes.get_mut(parent) {
            parent.children.push(id);
        }
        id
    }

    /// Append a node that is not part of the structural tree (e.g. a
    /// declaration from a header only reachable through links).
    pub fn add_detached(&mut self, node: DumpNode) -> NodeId {
        let id = self.nodes.len();
        self.nodes.push(node);
        id
    }

    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut DumpNode> {
        self.nodes.get_mut(id)
    }

    pub fn from_json(text: &str) -> Result<Self> {
        let dump: Self = serde_json::from_str(text)?;
        dump.validate()?;
        Ok(dump)
    }

    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(ExtractError::InputMissing(format!(
                "AST dump not found: {}",
                path.display()
            )));
        }
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text).map_err(|err| match err {
            ExtractError::InvalidDump(msg) => {
                ExtractError::InvalidDump(format!("{}: {msg}", path.display()))
            }
            other => other,
        })
    }

    fn validate(&self) -> Result<()> {
        if self.root >= self.nodes.len() {
            return Err(ExtractError::InvalidDump(format!(
                "root {} out of range ({} nodes)",
                self.root,
                self.nodes.len()
            )));
        }
        Ok(())
    }

    /// `None` when `root` is out of range, e.g. for a dump built without
    /// [`AstDump::from_json`].
    #[must_use]
    pub fn root(&self) -> Option<NodeRef<'_>> {
        self.node(self.root)
    }

    #[must_use]
    pub fn node(&self, id: NodeId) -> Option<NodeRef<'_>> {
        (id < self.nodes.len()).then_some(NodeRef {
            dump: self,
            index: id,
        })
    }

    /// True when the front-end reported error or fatal diagnostics.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.diagnostics
            .iter()
            .any(|diag| diag.severity >= Severity::Error)
    }
}

/// Borrowed cursor into an [`AstDump`]. Dangling links resolve to `None`.
#[derive(Debug, Clone, Copy)]
pub struct NodeRef<'a> {
    dump: &'a AstDump,
    index: NodeId,
}

impl<'a> NodeRef<'a> {
    #[must_use]
    pub const fn id(&self) -> NodeId {
        self.index
    }

    fn data(&self) -> &'a DumpNode {
        &self.dump.nodes[self.index]
    }

    fn link(&self, target: Option<NodeId>) -> Option<Self> {
        target.and_then(|id| self.dump.node(id))
    }
}

fn non_empty(value: Option<&String>) -> Option<&str> {
    value.map(String::as_str).filter(|s| !s.is_empty())
}

impl<'a> Cursor for NodeRef<'a> {
    fn kind(&self) -> CursorKind {
        self.data().kind
    }

    fn is_definition(&self) -> bool {
        self.data().is_definition
    }

    fn spelling(&self) -> Option<&str> {
        non_empty(self.data().spelling.as_ref())
    }

    fn display_name(&self) -> Option<&str> {
        non_empty(self.data().display_name.as_ref())
    }

    fn location(&self) -> Option<SourceSpan> {
        let data = self.data();
        let file = data.file.clone()?;
        let start_line = data.start_line?;
        let end_line = data.end_line.unwrap_or(start_line);
        Some(SourceSpan {
            file,
            start_line,
            end_line,
        })
    }

    fn usr(&self) -> Option<&str> {
        non_empty(self.data().usr.as_ref())
    }

    fn semantic_parent(&self) -> Option<Self> {
        self.link(self.data().semantic_parent)
    }

    fn referenced(&self) -> Option<Self> {
        self.link(self.data().referenced)
    }

    fn brief_comment(&self) -> Option<&str> {
        non_empty(self.data().brief_comment.as_ref())
    }

    fn raw_comment(&self) -> Option<&str> {
        non_empty(self.data().raw_comment.as_ref())
    }

    fn children(&self) -> Vec<Self> {
        self.data()
            .children
            .iter()
            .filter_map(|&id| self.dump.node(id))
            .collect()
    }

    fn node_key(&self) -> Option<usize> {
        Some(self.index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::qualified_name;

    #[test]
    fn qualified_name_walks_semantic_parents() {
        let mut dump = AstDump::new("src/a.cpp");
        let ns = dump.add_child(0, DumpNode::new(CursorKind::Namespace).spelling("Utils").parent(0));
        let class = dump.add_child(
            ns,
            DumpNode::new(CursorKind::Class)
                .spelling("MathUtils")
                .definition()
                .parent(ns),
        );
        let method = dump.add_child(
            class,
            DumpNode::new(CursorKind::Method).spelling("add").parent(class),
        );

        let cursor = dump.node(method).unwrap();
        assert_eq!(qualified_name(&cursor), "Utils::MathUtils::add");
    }

    #[test]
    fn anonymous_chain_falls_back_to_placeholder() {
        let mut dump = AstDump::new("src/a.cpp");
        let lambda = dump.add_child(0, DumpNode::new(CursorKind::Function).parent(0));
        assert_eq!(qualified_name(&dump.node(lambda).unwrap()), "<anonymous>");
    }

    #[test]
    fn dangling_links_resolve_to_none() {
        let mut dump = AstDump::new("src/a.cpp");
        let call = dump.add_child(0, DumpNode::new(CursorKind::CallExpr).references(999));
        let cursor = dump.node(call).unwrap();
        assert!(cursor.referenced().is_none());
        assert!(cursor.location().is_none());
    }

    #[test]
    fn semantic_parent_cycle_terminates() {
        let mut dump = AstDump::new("src/a.cpp");
        let a = dump.add_child(0, DumpNode::new(CursorKind::Namespace).spelling("a"));
        let b = dump.add_child(a, DumpNode::new(CursorKind::Namespace).spelling("b").parent(a));
        dump.node_mut(a).unwrap().semantic_parent = Some(b);

        let name = qualified_name(&dump.node(b).unwrap());
        assert!(name.ends_with("a::b"));
    }

    #[test]
    fn from_json_rejects_out_of_range_root() {
        let err = AstDump::from_json(r#"{"unit":"a.cpp","root":3,"nodes":[]}"#).unwrap_err();
        assert!(matches!(err, ExtractError::InvalidDump(_)));
    }

    #[test]
    fn unknown_kinds_deserialize_as_other() {
        let dump = AstDump::from_json(
            r#"{"unit":"a.cpp","nodes":[{"kind":"translation_unit","children":[1]},{"kind":"var_decl"}]}"#,
        )
        .unwrap();
        assert_eq!(dump.nodes[1].kind, CursorKind::Other);
        assert_eq!(dump.root().unwrap().children().len(), 1);
    }

    #[test]
    fn unvalidated_root_out_of_range_is_absent() {
        let dump: AstDump =
            serde_json::from_str(r#"{"unit":"a.cpp","root":5,"nodes":[{"kind":"translation_unit"}]}"#)
                .unwrap();
        assert!(dump.root().is_none());
        assert!(AstDump::from_json(r#"{"unit":"a.cpp","root":5,"nodes":[{"kind":"translation_unit"}]}"#).is_err());
    }

    #[test]
    fn error_diagnostics_mark_unit() {
        let mut dump = AstDump::new("src/a.cpp");
        assert!(!dump.has_errors());
        dump.diagnostics.push(Diagnostic {
            severity: Severity::Warning,
            message: "unused variable".into(),
            file: None,
            line: None,
        });
        assert!(!dump.has_errors());
        dump.diagnostics.push(Diagnostic {
            severity: Severity::Error,
            message: "unknown type name".into(),
            file: Some("src/a.cpp".into()),
            line: Some(3),
        });
        assert!(dump.has_errors());
    }
}
