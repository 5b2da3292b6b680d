//! Inheritance resolution ("dereferencing")
//!
//! Every entry of a load lives in an [`EntryArena`]. Resolving an entry merges
//! each declared parent's non-reserved attributes into the entry's own
//! document, without overwriting anything the entry already defines:
//!
//! - local definitions win over inherited ones
//! - earlier-declared parents win over later ones
//! - parents are resolved on demand first, so multi-level chains merge fully
//!   whatever order the entries were loaded in
//!
//! Missing parents and inheritance cycles never fail a resolution; they are
//! logged and returned as [`ResolveDiagnostic`]s.

use std::collections::HashMap;
use std::fmt;

use serde_yaml::Value;

use crate::config::DuplicatePolicy;
use crate::document::{is_reserved_key, RawEntry};

/// Load-scoped owner of all parsed entries
#[derive(Debug, Default)]
pub struct EntryArena {
    entries: Vec<RawEntry>,
    index: HashMap<String, usize>,
    policy: DuplicatePolicy,
}

impl EntryArena {
    pub fn new() -> Self {
        Self::default()
    }

    /// Arena whose id lookup follows `policy` for repeated ids
    pub fn with_policy(policy: DuplicatePolicy) -> Self {
        Self {
            policy,
            ..Self::default()
        }
    }

    /// Add an entry, returning its index
    ///
    /// An entry whose id is already present takes over the id lookup, except
    /// under [`DuplicatePolicy::KeepFirst`] where the first entry keeps it.
    /// Either way both entries stay in the arena.
    pub fn insert(&mut self, entry: RawEntry) -> usize {
        let idx = self.entries.len();
        match self.index.get(entry.uuid()).copied() {
            Some(previous) if self.policy == DuplicatePolicy::KeepFirst => {
                tracing::debug!(
                    "Model {} at {:?} shadowed by {:?}",
                    entry.uuid(),
                    entry.directory(),
                    self.entries[previous].directory()
                );
            }
            previous => {
                if let Some(previous) = previous {
                    tracing::debug!(
                        "Model {} at {:?} shadows {:?}",
                        entry.uuid(),
                        entry.directory(),
                        self.entries[previous].directory()
                    );
                }
                self.index.insert(entry.uuid().to_string(), idx);
            }
        }
        self.entries.push(entry);
        idx
    }

    pub fn get(&self, idx: usize) -> Option<&RawEntry> {
        self.entries.get(idx)
    }

    /// Index of the entry currently registered under `uuid`
    pub fn lookup(&self, uuid: &str) -> Option<usize> {
        self.index.get(uuid).copied()
    }

    /// Whether the entry at `idx` owns the lookup for its id
    pub fn is_current(&self, idx: usize) -> bool {
        self.entries
            .get(idx)
            .is_some_and(|entry| self.lookup(entry.uuid()) == Some(idx))
    }

    pub fn by_uuid(&self, uuid: &str) -> Option<&RawEntry> {
        self.lookup(uuid).map(|idx| &self.entries[idx])
    }

    /// Entries in load order, with their indices
    pub fn iter(&self) -> impl Iterator<Item = (usize, &RawEntry)> {
        self.entries.iter().enumerate()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.index.clear();
    }
}

/// Inherited attribute name to the ancestor id that declared it
pub type PropertyOrigins = HashMap<String, String>;

/// Which ancestor contributed each inherited attribute
///
/// Keyed by arena index, so entries sharing an id never share origins.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Provenance {
    sources: HashMap<usize, PropertyOrigins>,
}

impl Provenance {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(
        &mut self,
        entry: usize,
        property: impl Into<String>,
        ancestor: impl Into<String>,
    ) {
        self.sources
            .entry(entry)
            .or_default()
            .insert(property.into(), ancestor.into());
    }

    pub fn source(&self, entry: usize, property: &str) -> Option<&str> {
        self.sources
            .get(&entry)
            .and_then(|origins| origins.get(property))
            .map(String::as_str)
    }

    /// Origins of every inherited attribute of one entry
    pub fn origins(&self, entry: usize) -> Option<&PropertyOrigins> {
        self.sources.get(&entry)
    }

    /// Number of recorded (entry, attribute) origins
    pub fn len(&self) -> usize {
        self.sources.values().map(HashMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.values().all(HashMap::is_empty)
    }
}

/// Non-fatal problem found while resolving inheritance
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolveDiagnostic {
    /// A declared parent id is not in the arena
    MissingParent { model: String, parent: String },
    /// An `Inherits` item carries no parent id
    MalformedInherits { model: String, position: usize },
    /// Resolution reached a model already being resolved
    ///
    /// `chain` runs from the repeated model back to itself.
    CyclicInheritance { chain: Vec<String> },
}

impl fmt::Display for ResolveDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResolveDiagnostic::MissingParent { model, parent } => {
                write!(f, "Unable to find '{}' in model map (inherited by {})", parent, model)
            }
            ResolveDiagnostic::MalformedInherits { model, position } => {
                write!(f, "Inherits entry {} of {} has no UUID", position, model)
            }
            ResolveDiagnostic::CyclicInheritance { chain } => {
                write!(f, "Cyclic inheritance: {}", chain.join(" -> "))
            }
        }
    }
}

/// Resolves inheritance across an arena and records provenance
pub struct InheritanceResolver<'a> {
    arena: &'a mut EntryArena,
    provenance: &'a mut Provenance,
    diagnostics: Vec<ResolveDiagnostic>,
    stack: Vec<usize>,
}

impl<'a> InheritanceResolver<'a> {
    pub fn new(arena: &'a mut EntryArena, provenance: &'a mut Provenance) -> Self {
        Self {
            arena,
            provenance,
            diagnostics: Vec::new(),
            stack: Vec::new(),
        }
    }

    /// Resolve every entry in the arena
    pub fn resolve_all(mut self) -> Vec<ResolveDiagnostic> {
        for idx in 0..self.arena.len() {
            self.resolve(idx);
        }
        self.diagnostics
    }

    /// Resolve one entry and, on demand, its ancestors
    ///
    /// Already dereferenced entries are left untouched.
    pub fn resolve(&mut self, idx: usize) {
        if self.arena.entries[idx].is_dereferenced() {
            return;
        }

        let inherits = self.arena.entries[idx].inherits();
        let uuid = self.arena.entries[idx].uuid().to_string();

        self.stack.push(idx);
        for (position, parent_uuid) in inherits.into_iter().enumerate() {
            let Some(parent_uuid) = parent_uuid else {
                self.report(ResolveDiagnostic::MalformedInherits {
                    model: uuid.clone(),
                    position,
                });
                continue;
            };

            let Some(parent) = self.arena.lookup(&parent_uuid) else {
                self.report(ResolveDiagnostic::MissingParent {
                    model: uuid.clone(),
                    parent: parent_uuid,
                });
                continue;
            };

            if let Some(start) = self.stack.iter().position(|&i| i == parent) {
                // The parent's attributes are still merged as they stand.
                let mut chain: Vec<String> = self.stack[start..]
                    .iter()
                    .map(|&i| self.arena.entries[i].uuid().to_string())
                    .collect();
                chain.push(parent_uuid);
                self.report(ResolveDiagnostic::CyclicInheritance { chain });
            } else {
                self.resolve(parent);
            }

            self.merge(idx, parent);
        }
        self.stack.pop();

        self.arena.entries[idx].mark_dereferenced();
    }

    /// Diagnostics collected so far
    pub fn diagnostics(&self) -> &[ResolveDiagnostic] {
        &self.diagnostics
    }

    pub fn into_diagnostics(self) -> Vec<ResolveDiagnostic> {
        self.diagnostics
    }

    fn report(&mut self, diagnostic: ResolveDiagnostic) {
        tracing::warn!("{}", diagnostic);
        self.diagnostics.push(diagnostic);
    }

    /// Copy the parent's attributes the child does not define yet
    fn merge(&mut self, child: usize, parent: usize) {
        if child == parent {
            return;
        }

        let parent_entry = &self.arena.entries[parent];
        let parent_uuid = parent_entry.uuid().to_string();
        let inherited: Vec<(String, Value, String)> = parent_entry
            .properties()
            .map(|(name, value)| {
                // Pass along the declaring ancestor, not the intermediate parent
                let origin = self
                    .provenance
                    .source(parent, name)
                    .unwrap_or(parent_uuid.as_str())
                    .to_string();
                (name.to_string(), value.clone(), origin)
            })
            .collect();

        let Some(body) = self.arena.entries[child].body_mut() else {
            return;
        };

        for (name, value, origin) in inherited {
            if is_reserved_key(&name) || body.contains_key(name.as_str()) {
                continue;
            }
            body.insert(Value::String(name.clone()), value);
            self.provenance.record(child, name, origin);
        }
    }
}
