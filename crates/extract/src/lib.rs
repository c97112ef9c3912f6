//! # Knowledge Graph Extract
//!
//! Symbol registry and call-graph extraction over C++ syntax trees.
//!
//! ## Features
//!
//! - **Front-end neutral** - walks any [`Cursor`] implementation
//! - **Membership gating** - only definitions and calls inside the project are recorded
//! - **Stable identities** - unified symbol references, location fallback otherwise
//! - **Deterministic output** - units extracted in parallel, merged in path order
//!
//! ## Architecture
//!
//! ```text
//! *.ast.json (one per translation unit)
//!     │
//!     ├──> AstDump / NodeRef (Cursor)
//!     │
//!     ├──> CallGraphExtractor (worklist traversal)
//!     │      ├─ Class definitions  -> class entries
//!     │      ├─ Function definitions -> SymbolRegistry
//!     │      └─ Call expressions   -> call facts on the enclosing function
//!     │
//!     └──> Extraction ──> Analysis (analysis.json) ──> summary
//! ```

mod analysis;
mod ast;
mod ast_dump;
mod comment;
mod discover;
mod error;
mod extractor;
mod registry;
mod scope;
mod summary;

pub use analysis::{read_analysis, write_analysis, Analysis, CallRecord, ClassRecord, FunctionRecord};
pub use ast::{qualified_name, simple_name, Cursor, CursorKind, SourceSpan, ANONYMOUS, SCOPE_SEPARATOR};
pub use ast_dump::{AstDump, Diagnostic, DumpNode, NodeId, NodeRef, Severity, AST_DUMP_SUFFIX};
pub use comment::{clean_comment, description_of};
pub use discover::{discover_dumps, load_dumps};
pub use error::{ExtractError, Result};
pub use extractor::{extract_unit, extract_units, CallGraphExtractor, Extraction, UNKNOWN_CALLEE};
pub use registry::{CallRef, Location, Symbol, SymbolFacts, SymbolId, SymbolRegistry};
pub use scope::{absolute_path, normalize_path, relative_to_project, InScope, Scope};
pub use summary::render_summary;
