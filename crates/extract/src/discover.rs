use crate::ast_dump::{AstDump, AST_DUMP_SUFFIX};
use crate::error::{ExtractError, Result};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Resolve inputs (dump files or directories containing `*.ast.json`) into a
/// sorted, de-duplicated list of dump paths.
pub fn discover_dumps(inputs: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let mut found = Vec::new();
    for input in inputs {
        if !input.exists() {
            return Err(ExtractError::InputMissing(format!(
                "path does not exist: {}",
                input.display()
            )));
        }
        if input.is_file() {
            found.push(input.clone());
            continue;
        }
        for entry in WalkDir::new(input).follow_links(true) {
            let entry = entry.map_err(|e| ExtractError::IoError(e.into()))?;
            if entry.file_type().is_file() && is_dump(entry.path()) {
                found.push(entry.into_path());
            }
        }
    }

    found.sort();
    found.dedup();
    if found.is_empty() {
        return Err(ExtractError::InputMissing(format!(
            "no {AST_DUMP_SUFFIX} files found in {}",
            inputs
                .iter()
                .map(|p| p.display().to_string())
                .collect::<Vec<_>>()
                .join(", ")
        )));
    }
    Ok(found)
}

/// Load every discovered dump. Any unreadable dump fails the run.
pub fn load_dumps(inputs: &[PathBuf]) -> Result<Vec<AstDump>> {
    let paths = discover_dumps(inputs)?;
    log::info!("Loading {} AST dump(s)", paths.len());
    paths.iter().map(|path| AstDump::load(path)).collect()
}

fn is_dump(path: &Path) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .is_some_and(|name| name.ends_with(AST_DUMP_SUFFIX))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn finds_dumps_recursively_in_sorted_order() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("nested")).unwrap();
        for name in ["b.ast.json", "nested/a.ast.json", "notes.json"] {
            std::fs::write(dir.path().join(name), "{}").unwrap();
        }

        let found = discover_dumps(&[dir.path().to_path_buf()]).unwrap();
        assert_eq!(
            found,
            vec![
                dir.path().join("b.ast.json"),
                dir.path().join("nested/a.ast.json"),
            ]
        );
    }

    #[test]
    fn empty_directory_is_input_missing() {
        let dir = tempfile::tempdir().unwrap();
        let err = discover_dumps(&[dir.path().to_path_buf()]).unwrap_err();
        assert!(matches!(err, ExtractError::InputMissing(_)));
    }

    #[test]
    fn missing_path_is_input_missing() {
        let err = discover_dumps(&[PathBuf::from("/no/such/dir")]).unwrap_err();
        assert!(matches!(err, ExtractError::InputMissing(_)));
    }
}
