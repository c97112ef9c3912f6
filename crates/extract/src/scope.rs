use crate::ast::SourceSpan;
use std::collections::BTreeSet;
use std::path::{Component, Path, PathBuf};

/// Membership predicate: is this location part of the analyzed unit?
pub trait InScope {
    fn contains(&self, span: &SourceSpan) -> bool;
}

impl<F> InScope for F
where
    F: Fn(&SourceSpan) -> bool,
{
    fn contains(&self, span: &SourceSpan) -> bool {
        self(span)
    }
}

/// Built-in membership predicates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Scope {
    /// Only nodes declared in one of these files.
    Files(BTreeSet<PathBuf>),
    /// Any node declared under this directory.
    Directory(PathBuf),
}

impl Scope {
    pub fn files<I, P>(paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        Self::Files(
            paths
                .into_iter()
                .map(|path| absolute_path(path.as_ref()))
                .collect(),
        )
    }

    pub fn directory(root: impl AsRef<Path>) -> Self {
        Self::Directory(absolute_path(root.as_ref()))
    }
}

impl InScope for Scope {
    fn contains(&self, span: &SourceSpan) -> bool {
        let file = absolute_path(&span.file);
        match self {
            Self::Files(files) => files.contains(&file),
            Self::Directory(root) => file.starts_with(root),
        }
    }
}

/// Lexically resolve `.` and `..` components. Does not touch the filesystem.
#[must_use]
pub fn normalize_path(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !out.pop() {
                    out.push("..");
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

/// Resolve a relative path against the working directory, then normalize it.
/// Falls back to the lexical form when the working directory is unavailable.
#[must_use]
pub fn absolute_path(path: &Path) -> PathBuf {
    if path.is_absolute() {
        return normalize_path(path);
    }
    match std::path::absolute(path) {
        Ok(resolved) => normalize_path(&resolved),
        Err(err) => {
            log::debug!("cannot resolve {}: {err}", path.display());
            normalize_path(path)
        }
    }
}

/// Path of `file` relative to `project_root` with `/` separators; `.` for the
/// root itself and the absolute path for files outside it.
#[must_use]
pub fn relative_to_project(file: &Path, project_root: &Path) -> String {
    let file = absolute_path(file);
    let root = absolute_path(project_root);
    if file == root {
        return ".".to_string();
    }
    let shown = file.strip_prefix(&root).unwrap_or(&file);
    to_posix(shown)
}

fn to_posix(path: &Path) -> String {
    let mut out = String::new();
    for component in path.components() {
        match component {
            Component::RootDir => out.push('/'),
            Component::Prefix(prefix) => out.push_str(&prefix.as_os_str().to_string_lossy()),
            other => {
                if !out.is_empty() && !out.ends_with('/') {
                    out.push('/');
                }
                out.push_str(&other.as_os_str().to_string_lossy());
            }
        }
    }
    out
}
