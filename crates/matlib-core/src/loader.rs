//! Full catalog loads
//!
//! A load runs in three passes over all libraries at once:
//!
//! 1. every document of every library is parsed into one [`EntryArena`]
//! 2. every entry is dereferenced
//! 3. entries are materialized in load order and handed to the sink
//!
//! Parsing must finish for all libraries before resolution starts, since a
//! parent may live in any library. Broken documents are logged and skipped;
//! an entry from a non-local library aborts the load.

use std::path::{Path, PathBuf};

use crate::catalog::ModelCatalog;
use crate::config::{DuplicatePolicy, HostPaths, MaterialConfig};
use crate::discovery::discover_libraries;
use crate::document::{parse_document, uuid_from_path};
use crate::enumerate::enumerate_documents;
use crate::error::{MatlibError, Result};
use crate::library::{LibraryId, LibraryModelStore, ModelLibrary, ModelSink};
use crate::materialize::materialize;
use crate::resolver::{EntryArena, InheritanceResolver, Provenance, ResolveDiagnostic};

/// A document left out of the catalog
#[derive(Debug)]
pub struct SkippedDocument {
    pub path: PathBuf,
    pub error: MatlibError,
}

/// Outcome of one full load
#[derive(Debug)]
pub struct LoadReport {
    pub catalog: ModelCatalog,
    /// Libraries in load order; a model's `library` indexes this list
    pub libraries: Vec<ModelLibrary>,
    pub skipped: Vec<SkippedDocument>,
    pub diagnostics: Vec<ResolveDiagnostic>,
    /// Number of documents parsed successfully
    pub parsed: usize,
}

impl LoadReport {
    pub fn library(&self, id: LibraryId) -> Option<&ModelLibrary> {
        self.libraries.get(id.0)
    }
}

/// Load every model of `libraries` into a fresh catalog
///
/// Libraries are loaded in slice order; a model's [`LibraryId`] is its
/// library's index in the slice.
pub fn load_libraries<S: ModelSink>(
    libraries: &[ModelLibrary],
    policy: DuplicatePolicy,
    sink: &mut S,
) -> Result<LoadReport> {
    let mut arena = EntryArena::with_policy(policy);
    let mut skipped = Vec::new();

    for (idx, library) in libraries.iter().enumerate() {
        let id = LibraryId(idx);
        let mut count = 0;
        for path in enumerate_documents(&library.directory) {
            match parse_document(id, &path) {
                Ok(entry) => {
                    tracing::debug!("Parsed model {} from {:?}", entry.uuid(), path);
                    arena.insert(entry);
                    count += 1;
                }
                Err(error) => {
                    tracing::warn!("Invalid model '{}': {}", path.display(), error);
                    skipped.push(SkippedDocument { path, error });
                }
            }
        }
        tracing::info!(
            "Library {} ({}): {} model documents",
            library.name,
            library.directory.display(),
            count
        );
    }

    let mut provenance = Provenance::new();
    let diagnostics = InheritanceResolver::new(&mut arena, &mut provenance).resolve_all();

    let mut catalog = ModelCatalog::with_policy(policy);
    for (idx, entry) in arena.iter() {
        if policy == DuplicatePolicy::KeepFirst && !arena.is_current(idx) {
            tracing::debug!(
                "Model {} already loaded, skipping {:?}",
                entry.uuid(),
                entry.directory()
            );
            continue;
        }
        let library = &libraries[entry.library().0];
        let model = materialize(entry, library, provenance.origins(idx))?;
        if !catalog.admit(entry.uuid(), &library.name)? {
            continue;
        }
        let handle = sink.add_model(entry.library(), library, model, entry.directory());
        catalog.insert(handle, &library.name)?;
    }

    tracing::info!(
        "Loaded {} models from {} libraries ({} skipped, {} diagnostics)",
        catalog.len(),
        libraries.len(),
        skipped.len(),
        diagnostics.len()
    );

    Ok(LoadReport {
        catalog,
        libraries: libraries.to_vec(),
        skipped,
        diagnostics,
        parsed: arena.len(),
    })
}

/// Discovers libraries from configuration and loads them
#[derive(Debug)]
pub struct ModelLoader {
    config: MaterialConfig,
    host: HostPaths,
    extra: Vec<ModelLibrary>,
    store: LibraryModelStore,
}

impl ModelLoader {
    pub fn new(config: MaterialConfig, host: HostPaths) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            host,
            extra: Vec::new(),
            store: LibraryModelStore::new(),
        })
    }

    /// Append a library after the discovered ones
    pub fn add_library(&mut self, library: ModelLibrary) {
        self.extra.push(library);
    }

    /// Libraries a load would visit, in load order
    pub fn libraries(&self) -> Vec<ModelLibrary> {
        let mut libraries = discover_libraries(&self.config, &self.host);
        libraries.extend(self.extra.iter().cloned());
        libraries
    }

    /// Run a full load from scratch
    ///
    /// Models from any previous load are dropped from the store first.
    pub fn load(&mut self) -> Result<LoadReport> {
        self.store.clear();
        let libraries = self.libraries();
        load_libraries(&libraries, self.config.duplicate_policy, &mut self.store)
    }

    /// Models filed by the last load
    pub fn store(&self) -> &LibraryModelStore {
        &self.store
    }

    pub fn config(&self) -> &MaterialConfig {
        &self.config
    }

    /// Unique id of the document at `path`
    pub fn uuid_from_path(path: &Path) -> Result<String> {
        uuid_from_path(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::library::LibrarySource;
    use std::fs;

    #[test]
    fn test_empty_library_list() {
        let mut store = LibraryModelStore::new();
        let report = load_libraries(&[], DuplicatePolicy::Replace, &mut store).unwrap();
        assert!(report.catalog.is_empty());
        assert_eq!(report.parsed, 0);
        assert_eq!(store.count(), 0);
    }

    #[test]
    fn test_load_replaces_previous_store() {
        let root = tempfile::tempdir().unwrap();
        let lib_dir = root.path().join("lib");
        fs::create_dir_all(&lib_dir).unwrap();
        fs::write(
            lib_dir.join("Density.yml"),
            "Model:\n  Name: Density\n  UUID: density\n",
        )
        .unwrap();

        let mut config = MaterialConfig::default();
        config.resources.use_built_in_materials = false;
        let host = HostPaths::new(root.path().join("res"), root.path().join("user"));
        let mut loader = ModelLoader::new(config, host).unwrap();
        loader.add_library(ModelLibrary::local("Extra", &lib_dir, LibrarySource::Custom));

        let first = loader.load().unwrap();
        let second = loader.load().unwrap();

        assert_eq!(first.catalog, second.catalog);
        assert_eq!(loader.store().count(), 1);
        assert!(loader
            .store()
            .get(LibraryId(0), Path::new("Density.yml"))
            .is_some());
    }
}
