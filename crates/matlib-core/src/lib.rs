//! matlib-core: material model library loading
//!
//! Loads libraries of YAML model documents into a catalog of typed models.
//!
//! # Modules
//!
//! - **Document**: parsing of model documents into raw entries
//! - **Enumerate**: recursive discovery of documents under a library root
//! - **Resolver**: inheritance resolution with provenance tracking
//! - **Materialize**: conversion of resolved entries into [`Model`]s
//! - **Discovery**: which library roots take part in a load, and in what order
//! - **Loader**: full catalog loads over all discovered libraries
//! - **Config**: library switches, module registrations, duplicate handling
//!
//! # Pipeline
//!
//! ```text
//! discover → enumerate → parse → resolve → materialize → catalog
//! ```
//!
//! # Example
//!
//! ```ignore
//! use matlib_core::{HostPaths, MaterialConfig, ModelLoader};
//!
//! let mut loader = ModelLoader::new(MaterialConfig::default(), HostPaths::standard())?;
//! let report = loader.load()?;
//! for model in report.catalog.iter() {
//!     println!("{} ({})", model.name, model.uuid);
//! }
//! ```

pub mod catalog;
pub mod config;
pub mod discovery;
pub mod document;
pub mod enumerate;
pub mod error;
pub mod library;
pub mod loader;
pub mod materialize;
pub mod model;
pub mod resolver;

pub use catalog::ModelCatalog;
pub use config::{DuplicatePolicy, HostPaths, MaterialConfig, ModuleResource, ResourceConfig};
pub use discovery::discover_libraries;
pub use document::{parse_document, uuid_from_path, RawEntry, DOCUMENT_EXTENSION, RESERVED_KEYS};
pub use enumerate::{enumerate_documents, DocumentWalk};
pub use error::{MatlibError, Result};
pub use library::{
    LibraryId, LibraryLocation, LibraryModelStore, LibrarySource, ModelLibrary, ModelSink,
};
pub use loader::{load_libraries, LoadReport, ModelLoader, SkippedDocument};
pub use materialize::materialize;
pub use model::{Model, ModelKind, ModelProperty};
pub use resolver::{EntryArena, InheritanceResolver, PropertyOrigins, Provenance, ResolveDiagnostic};
