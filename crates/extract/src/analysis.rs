//! Canonical interchange form shared by extraction and assembly.

use crate::error::{ExtractError, Result};
use crate::extractor::Extraction;
use crate::registry::{CallRef, Location, Symbol, SymbolFacts, SymbolId, SymbolRegistry};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Analysis {
    pub project_root: String,
    #[serde(default)]
    pub classes: Vec<ClassRecord>,
    #[serde(default)]
    pub free_functions: Vec<FunctionRecord>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub best_effort: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassRecord {
    pub name: String,
    #[serde(default)]
    pub methods: Vec<FunctionRecord>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionRecord {
    pub name: String,
    #[serde(default)]
    pub qualified: String,
    pub location: Location,
    #[serde(default)]
    pub calls: Vec<CallRecord>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// `location` is present exactly when `external` is false.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallRecord {
    pub name: String,
    #[serde(default)]
    pub qualified: String,
    #[serde(default = "default_external")]
    pub external: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<Location>,
}

fn default_external() -> bool {
    true
}

fn is_false(value: &bool) -> bool {
    !*value
}

fn or_name<'a>(qualified: &'a str, name: &'a str) -> &'a str {
    if qualified.is_empty() {
        name
    } else {
        qualified
    }
}

impl FunctionRecord {
    /// Qualified name, falling back to the display name for sparse input.
    #[must_use]
    pub fn qualified_name(&self) -> &str {
        or_name(&self.qualified, &self.name)
    }

    fn from_symbol(symbol: &Symbol, registry: &SymbolRegistry) -> Self {
        let calls = symbol
            .sorted_calls()
            .into_iter()
            .map(|call| CallRecord::from_call(call, registry))
            .collect();
        Self {
            name: symbol.simple_name.clone(),
            qualified: symbol.qualified_name.clone(),
            location: symbol.location.clone(),
            calls,
            description: symbol.description.clone(),
        }
    }

    fn identity(&self) -> SymbolId {
        SymbolId::fallback(self.qualified_name(), &self.location)
    }

    fn facts(&self, owner: Option<&str>) -> SymbolFacts {
        SymbolFacts {
            qualified_name: self.qualified_name().to_string(),
            simple_name: self.name.clone(),
            location: self.location.clone(),
            owner: owner.map(str::to_string),
            description: self.description.clone().filter(|d| !d.is_empty()),
        }
    }
}

impl CallRecord {
    #[must_use]
    pub fn qualified_name(&self) -> &str {
        or_name(&self.qualified, &self.name)
    }

    fn from_call(call: &CallRef, registry: &SymbolRegistry) -> Self {
        match call.callee.as_ref().and_then(|id| registry.get(id)) {
            Some(callee) => Self {
                name: call.name.clone(),
                qualified: callee.qualified_name.clone(),
                external: false,
                location: Some(callee.location.clone()),
            },
            None => Self {
                name: call.name.clone(),
                qualified: call.name.clone(),
                external: true,
                location: None,
            },
        }
    }
}

impl Analysis {
    /// Deterministic canonical record: classes by name, methods by simple
    /// name, free functions by qualified name, calls by display name.
    #[must_use]
    pub fn from_extraction(project_root: impl Into<String>, extraction: &Extraction) -> Self {
        let registry = &extraction.registry;
        let classes = extraction
            .classes
            .keys()
            .map(|class| ClassRecord {
                name: class.clone(),
                methods: extraction
                    .methods_of(class)
                    .into_iter()
                    .map(|symbol| FunctionRecord::from_symbol(symbol, registry))
                    .collect(),
            })
            .collect();
        let free_functions = extraction
            .sorted_free_functions()
            .into_iter()
            .map(|symbol| FunctionRecord::from_symbol(symbol, registry))
            .collect();

        Self {
            project_root: project_root.into(),
            classes,
            free_functions,
            best_effort: extraction.best_effort,
        }
    }

    /// Rebuild classes, free functions and registry from the record.
    ///
    /// Identities are location-based; internal calls are re-linked to the
    /// recorded definition with the same qualified name.
    #[must_use]
    pub fn into_extraction(&self) -> Extraction {
        let mut extraction = Extraction {
            best_effort: self.best_effort,
            ..Extraction::default()
        };
        let mut callers: Vec<(SymbolId, &FunctionRecord)> = Vec::new();

        for class in &self.classes {
            let mut methods = Vec::with_capacity(class.methods.len());
            for method in &class.methods {
                let id = extraction
                    .registry
                    .register_or_update(method.identity(), method.facts(Some(class.name.as_str())));
                methods.push(id.clone());
                callers.push((id, method));
            }
            extraction
                .classes
                .entry(class.name.clone())
                .or_default()
                .extend(methods);
        }

        for function in &self.free_functions {
            let id = extraction
                .registry
                .register_or_update(function.identity(), function.facts(None));
            extraction.free_functions.insert(id.clone());
            callers.push((id, function));
        }

        for (caller, record) in callers {
            for call in &record.calls {
                let name = call.qualified_name();
                let callee = if call.external {
                    None
                } else {
                    extraction
                        .registry
                        .lookup_qualified(name)
                        .map(|symbol| symbol.id.clone())
                };
                extraction.registry.record_call(
                    &caller,
                    CallRef {
                        callee,
                        name: name.to_string(),
                    },
                );
            }
        }

        extraction
    }

    #[must_use]
    pub fn function_count(&self) -> usize {
        self.classes.iter().map(|c| c.methods.len()).sum::<usize>() + self.free_functions.len()
    }
}

pub fn read_analysis(path: &Path) -> Result<Analysis> {
    if !path.exists() {
        return Err(ExtractError::InputMissing(format!(
            "analysis file not found: {}",
            path.display()
        )));
    }
    let bytes = std::fs::read(path)?;
    Ok(serde_json::from_slice(&bytes)?)
}

/// Pretty-printed, written to a temp file and renamed into place.
pub fn write_analysis(path: &Path, analysis: &Analysis) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let bytes = serde_json::to_vec_pretty(analysis)?;
    let tmp = path.with_extension("json.tmp");
    std::fs::write(&tmp, bytes)?;
    std::fs::rename(&tmp, path)?;
    log::info!(
        "Analysis written to {} ({} functions)",
        path.display(),
        analysis.function_count()
    );
    Ok(())
}
