//! Model libraries and the sink that receives finalized models
//!
//! Libraries are plain descriptors referenced by [`LibraryId`]; the id is the
//! library's position in the list a load was started with.

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::model::Model;

/// Index of a library within one load
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LibraryId(pub usize);

/// Where a library's models come from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum LibrarySource {
    /// Shipped with the host application
    Builtin,
    /// Contributed by a registered module
    Module,
    /// The user's configuration directory
    User,
    /// A directory named in configuration
    Custom,
}

/// Storage backing a library
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum LibraryLocation {
    /// File-backed library rooted at a directory
    Local,
    /// Network library; models cannot be materialized from it yet
    Remote { url: String },
}

/// A root location containing model documents
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelLibrary {
    pub name: String,
    pub directory: PathBuf,
    #[serde(default)]
    pub icon: Option<String>,
    pub source: LibrarySource,
    pub location: LibraryLocation,
}

impl ModelLibrary {
    /// Create a file-backed library
    pub fn local(
        name: impl Into<String>,
        directory: impl Into<PathBuf>,
        source: LibrarySource,
    ) -> Self {
        Self {
            name: name.into(),
            directory: directory.into(),
            icon: None,
            source,
            location: LibraryLocation::Local,
        }
    }

    pub fn with_icon(mut self, icon: impl Into<String>) -> Self {
        let icon = icon.into();
        self.icon = if icon.is_empty() { None } else { Some(icon) };
        self
    }

    pub fn is_local(&self) -> bool {
        matches!(self.location, LibraryLocation::Local)
    }

    /// Path of a document relative to the library root
    ///
    /// Paths outside the root are returned unchanged.
    pub fn relative_path(&self, path: &Path) -> PathBuf {
        path.strip_prefix(&self.directory)
            .map(Path::to_path_buf)
            .unwrap_or_else(|_| path.to_path_buf())
    }
}

/// Receiver of finalized models
///
/// The sink takes ownership of each model and hands back the shared handle
/// the catalog stores.
pub trait ModelSink {
    fn add_model(
        &mut self,
        library: LibraryId,
        descriptor: &ModelLibrary,
        model: Model,
        directory: &Path,
    ) -> Arc<Model>;
}

/// In-memory sink filing models per library by relative document path
#[derive(Debug, Default)]
pub struct LibraryModelStore {
    libraries: HashMap<LibraryId, BTreeMap<PathBuf, Arc<Model>>>,
}

impl LibraryModelStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Models filed under a library, ordered by relative path
    pub fn models(&self, library: LibraryId) -> impl Iterator<Item = (&PathBuf, &Arc<Model>)> {
        self.libraries.get(&library).into_iter().flat_map(|m| m.iter())
    }

    pub fn get(&self, library: LibraryId, relative: &Path) -> Option<&Arc<Model>> {
        self.libraries.get(&library).and_then(|m| m.get(relative))
    }

    pub fn count(&self) -> usize {
        self.libraries.values().map(BTreeMap::len).sum()
    }

    pub fn clear(&mut self) {
        self.libraries.clear();
    }
}

impl ModelSink for LibraryModelStore {
    fn add_model(
        &mut self,
        library: LibraryId,
        descriptor: &ModelLibrary,
        model: Model,
        directory: &Path,
    ) -> Arc<Model> {
        let handle = Arc::new(model);
        self.libraries
            .entry(library)
            .or_default()
            .insert(descriptor.relative_path(directory), Arc::clone(&handle));
        handle
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ModelKind;

    #[test]
    fn test_local_and_remote() {
        let local = ModelLibrary::local("System", "/res/Models", LibrarySource::Builtin);
        assert!(local.is_local());

        let remote = ModelLibrary {
            location: LibraryLocation::Remote {
                url: "https://example.org/models".to_string(),
            },
            ..local.clone()
        };
        assert!(!remote.is_local());
    }

    #[test]
    fn test_empty_icon_is_none() {
        let lib = ModelLibrary::local("Fem", "/fem", LibrarySource::Module).with_icon("");
        assert_eq!(lib.icon, None);
        let lib = lib.with_icon(":/icons/fem.svg");
        assert_eq!(lib.icon.as_deref(), Some(":/icons/fem.svg"));
    }

    #[test]
    fn test_store_files_by_relative_path() {
        let lib = ModelLibrary::local("User", "/home/u/Models", LibrarySource::User);
        let path = PathBuf::from("/home/u/Models/Mechanical/Density.yml");
        let model = Model::new(
            LibraryId(2),
            ModelKind::Physical,
            "Density",
            &path,
            "abc",
            "",
            "",
            "",
        );

        let mut store = LibraryModelStore::new();
        let handle = store.add_model(LibraryId(2), &lib, model, &path);

        assert_eq!(store.count(), 1);
        let filed = store
            .get(LibraryId(2), Path::new("Mechanical/Density.yml"))
            .unwrap();
        assert!(Arc::ptr_eq(filed, &handle));
    }
}
