use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use std::fmt;

/// Opaque identity of one declaration across an analysis run.
///
/// Normally the front-end's unified symbol reference; see [`SymbolId::fallback`]
/// for declarations that have none.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SymbolId(String);

impl SymbolId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Qualified name plus file and line range.
    #[must_use]
    pub fn fallback(qualified_name: &str, location: &Location) -> Self {
        Self(format!(
            "{qualified_name}@{}:{}-{}",
            location.file, location.start_line, location.end_line
        ))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SymbolId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Project-relative source range. Reads both `{file, start_line, end_line}`
/// and the abbreviated `{file, line}`; always writes the range form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "LocationRepr")]
pub struct Location {
    pub file: String,
    pub start_line: u32,
    pub end_line: u32,
}

impl Location {
    pub fn new(file: impl Into<String>, start_line: u32, end_line: u32) -> Self {
        Self {
            file: file.into(),
            start_line,
            end_line,
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}-{}", self.file, self.start_line, self.end_line)
    }
}

#[derive(Deserialize)]
struct LocationRepr {
    #[serde(default)]
    file: String,
    #[serde(default)]
    start_line: Option<u32>,
    #[serde(default)]
    end_line: Option<u32>,
    #[serde(default)]
    line: Option<u32>,
}

impl From<LocationRepr> for Location {
    fn from(repr: LocationRepr) -> Self {
        let start_line = repr.start_line.or(repr.line).unwrap_or(0);
        let end_line = repr.end_line.or(repr.line).unwrap_or(start_line);
        Self {
            file: repr.file,
            start_line,
            end_line,
        }
    }
}

/// One call observed inside a function body: the resolved callee identity,
/// if any, and the name used to refer to it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CallRef {
    pub callee: Option<SymbolId>,
    pub name: String,
}

impl CallRef {
    pub fn resolved(callee: SymbolId, name: impl Into<String>) -> Self {
        Self {
            callee: Some(callee),
            name: name.into(),
        }
    }

    pub fn unresolved(name: impl Into<String>) -> Self {
        Self {
            callee: None,
            name: name.into(),
        }
    }
}

/// Facts about a declaration gathered at one sighting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymbolFacts {
    pub qualified_name: String,
    pub simple_name: String,
    pub location: Location,
    pub owner: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Symbol {
    pub id: SymbolId,
    pub qualified_name: String,
    pub simple_name: String,
    pub location: Location,
    pub owner: Option<String>,
    pub description: Option<String>,
    pub calls: BTreeSet<CallRef>,
}

impl Symbol {
    fn from_facts(id: SymbolId, facts: SymbolFacts) -> Self {
        Self {
            id,
            qualified_name: facts.qualified_name,
            simple_name: facts.simple_name,
            location: facts.location,
            owner: facts.owner,
            description: facts.description,
            calls: BTreeSet::new(),
        }
    }

    /// Fill `owner`/`description` only where still absent.
    fn backfill(&mut self, owner: Option<String>, description: Option<String>) {
        if self.owner.is_none() {
            self.owner = owner;
        }
        if self.description.is_none() {
            self.description = description;
        }
    }

    /// Calls ordered by display name, then callee identity.
    #[must_use]
    pub fn sorted_calls(&self) -> Vec<&CallRef> {
        let mut calls: Vec<&CallRef> = self.calls.iter().collect();
        calls.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.callee.cmp(&b.callee)));
        calls
    }
}

/// Identity-keyed symbol table with a secondary qualified-name index.
///
/// Entries are never removed or renamed; repeated registration only
/// backfills missing `owner`/`description`.
#[derive(Debug, Clone, Default)]
pub struct SymbolRegistry {
    symbols: HashMap<SymbolId, Symbol>,
    by_qualified: HashMap<String, Vec<SymbolId>>,
}

impl SymbolRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_or_update(&mut self, id: SymbolId, facts: SymbolFacts) -> SymbolId {
        if let Some(existing) = self.symbols.get_mut(&id) {
            existing.backfill(facts.owner, facts.description);
            return id;
        }

        self.by_qualified
            .entry(facts.qualified_name.clone())
            .or_default()
            .push(id.clone());
        self.symbols
            .insert(id.clone(), Symbol::from_facts(id.clone(), facts));
        id
    }

    /// Add a call fact to a registered caller. Returns `false` when the
    /// caller is unknown or the pair was already recorded.
    pub fn record_call(&mut self, caller: &SymbolId, call: CallRef) -> bool {
        self.symbols
            .get_mut(caller)
            .is_some_and(|symbol| symbol.calls.insert(call))
    }

    #[must_use]
    pub fn get(&self, id: &SymbolId) -> Option<&Symbol> {
        self.symbols.get(id)
    }

    #[must_use]
    pub fn contains(&self, id: &SymbolId) -> bool {
        self.symbols.contains_key(id)
    }

    /// First symbol registered under `qualified_name`.
    #[must_use]
    pub fn lookup_qualified(&self, qualified_name: &str) -> Option<&Symbol> {
        self.ids_for_qualified(qualified_name)
            .first()
            .and_then(|id| self.symbols.get(id))
    }

    /// All identities sharing `qualified_name` (overloads), in registration order.
    #[must_use]
    pub fn ids_for_qualified(&self, qualified_name: &str) -> &[SymbolId] {
        self.by_qualified
            .get(qualified_name)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Symbol> {
        self.symbols.values()
    }

    /// Merge another registry into this one with first-write-wins backfill
    /// and call-set union. Symbols are applied in identity order.
    pub fn absorb(&mut self, other: Self) {
        let mut incoming: Vec<Symbol> = other.symbols.into_values().collect();
        incoming.sort_by(|a, b| a.id.cmp(&b.id));

        for symbol in incoming {
            let Symbol {
                id,
                qualified_name,
                simple_name,
                location,
                owner,
                description,
                calls,
            } = symbol;
            let id = self.register_or_update(
                id,
                SymbolFacts {
                    qualified_name,
                    simple_name,
                    location,
                    owner,
                    description,
                },
            );
            if let Some(target) = self.symbols.get_mut(&id) {
                target.calls.extend(calls);
            }
        }
    }
}
