//! Model document parsing
//!
//! A model document is a YAML file with a single root key, `Model` or
//! `AppearanceModel`:
//!
//! ```yaml
//! Model:
//!   Name: "LinearElastic"
//!   UUID: "7b561d1d-fb9b-44f6-9da9-56a4f74d7536"
//!   URL: "https://en.wikipedia.org/wiki/Elasticity"
//!   Description: "Linear elastic material model"
//!   DOI: ""
//!   Inherits:
//!     - Density:
//!       UUID: "454661e5-265b-4320-8e6f-fcf6223ac3af"
//!   YoungsModulus:
//!     DisplayName: "Young's Modulus"
//!     Type: "Quantity"
//!     Units: "kPa"
//!     URL: ""
//!     Description: "Elastic modulus"
//! ```
//!
//! Parsing only extracts the identifying fields; properties stay in the raw
//! tree until the entry has been dereferenced and materialized.

use std::path::{Path, PathBuf};

use serde_yaml::{Mapping, Value};

use crate::error::{MatlibError, Result};
use crate::library::LibraryId;
use crate::model::ModelKind;

/// File extension of model documents
pub const DOCUMENT_EXTENSION: &str = "yml";

/// Keys that identify a model rather than declare a property
pub const RESERVED_KEYS: &[&str] = &["Name", "UUID", "URL", "Description", "DOI", "Inherits"];

pub fn is_reserved_key(key: &str) -> bool {
    RESERVED_KEYS.contains(&key)
}

/// Read a scalar YAML value as a string
///
/// Numbers and booleans are rendered in their plain form; null, sequences
/// and mappings yield `None`.
pub fn scalar_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Tagged(tagged) => scalar_string(&tagged.value),
        _ => None,
    }
}

/// Field lookup with a default for absent or non-scalar values
pub fn field_or(node: &Value, key: &str, default: &str) -> String {
    node.get(key)
        .and_then(scalar_string)
        .unwrap_or_else(|| default.to_string())
}

/// A parsed document that has not been materialized yet
#[derive(Debug, Clone)]
pub struct RawEntry {
    library: LibraryId,
    kind: ModelKind,
    name: String,
    directory: PathBuf,
    uuid: String,
    document: Value,
    dereferenced: bool,
}

impl RawEntry {
    pub fn new(
        library: LibraryId,
        kind: ModelKind,
        name: impl Into<String>,
        directory: impl Into<PathBuf>,
        uuid: impl Into<String>,
        document: Value,
    ) -> Self {
        Self {
            library,
            kind,
            name: name.into(),
            directory: directory.into(),
            uuid: uuid.into(),
            document,
            dereferenced: false,
        }
    }

    pub fn library(&self) -> LibraryId {
        self.library
    }

    pub fn kind(&self) -> ModelKind {
        self.kind
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    pub fn uuid(&self) -> &str {
        &self.uuid
    }

    /// The full parsed document, including the root key
    pub fn document(&self) -> &Value {
        &self.document
    }

    /// The mapping under the root key
    pub fn body(&self) -> Option<&Mapping> {
        self.document
            .get(self.kind.root_key())
            .and_then(Value::as_mapping)
    }

    pub(crate) fn body_mut(&mut self) -> Option<&mut Mapping> {
        self.document
            .get_mut(self.kind.root_key())
            .and_then(Value::as_mapping_mut)
    }

    pub fn field(&self, key: &str) -> Option<&Value> {
        self.body().and_then(|body| body.get(key))
    }

    pub fn has_field(&self, key: &str) -> bool {
        self.field(key).is_some()
    }

    /// Top-level attributes that are not reserved keys, in document order
    pub fn properties(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.body()
            .into_iter()
            .flat_map(|body| body.iter())
            .filter_map(|(k, v)| k.as_str().map(|k| (k, v)))
            .filter(|(k, _)| !is_reserved_key(k))
    }

    /// Declared `Inherits` entries, in document order
    ///
    /// Each item is the parent id, or `None` when the entry has no scalar
    /// `UUID`. Both the list form (`- UUID: ...`) and the keyed form
    /// (`Parent: { UUID: ... }`) are accepted.
    pub fn inherits(&self) -> Vec<Option<String>> {
        match self.field("Inherits") {
            Some(Value::Sequence(items)) => items.iter().map(inherit_uuid).collect(),
            Some(Value::Mapping(items)) => items.values().map(inherit_uuid).collect(),
            _ => Vec::new(),
        }
    }

    pub fn is_dereferenced(&self) -> bool {
        self.dereferenced
    }

    pub(crate) fn mark_dereferenced(&mut self) {
        self.dereferenced = true;
    }
}

/// Parent id from one `Inherits` item
///
/// FreeCAD-style documents nest the id one level down under the parent's
/// name (`- Density: { UUID: ... }` parses to a mapping whose only value
/// holds the `UUID`), so a missing top-level `UUID` falls through to that.
fn inherit_uuid(item: &Value) -> Option<String> {
    if let Some(uuid) = item.get("UUID").and_then(scalar_string) {
        return Some(uuid);
    }
    match item.as_mapping() {
        Some(map) if map.len() == 1 => map
            .values()
            .next()
            .and_then(|inner| inner.get("UUID"))
            .and_then(scalar_string),
        _ => None,
    }
}

/// Root kind of a parsed document
fn detect_kind(root: &Value) -> ModelKind {
    if root.get(ModelKind::Appearance.root_key()).is_some() {
        ModelKind::Appearance
    } else {
        ModelKind::Physical
    }
}

fn read_document(path: &Path) -> Result<Value> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| MatlibError::invalid_document(path, e.to_string()))?;
    serde_yaml::from_str(&content).map_err(|e| MatlibError::invalid_document(path, e.to_string()))
}

fn required_field(path: &Path, body: &Value, kind: ModelKind, key: &str) -> Result<String> {
    body.get(key)
        .and_then(scalar_string)
        .ok_or_else(|| MatlibError::invalid_document(path, format!("missing {}.{}", kind, key)))
}

/// Parse one document into a [`RawEntry`]
///
/// Fails with `DocumentNotFound` if the path is not a file, and with
/// `InvalidDocument` if the YAML cannot be parsed or lacks `UUID` or `Name`.
pub fn parse_document(library: LibraryId, path: &Path) -> Result<RawEntry> {
    if !path.is_file() {
        return Err(MatlibError::DocumentNotFound(path.to_path_buf()));
    }

    let root = read_document(path)?;
    let kind = detect_kind(&root);
    let body = root
        .get(kind.root_key())
        .filter(|b| b.is_mapping())
        .ok_or_else(|| MatlibError::invalid_document(path, format!("missing {} root", kind)))?;

    let uuid = required_field(path, body, kind, "UUID")?;
    let name = required_field(path, body, kind, "Name")?;

    Ok(RawEntry::new(library, kind, name, path, uuid, root))
}

/// Read only the unique id of a document
///
/// Fails with `ModelNotFound` if the path is not a file.
pub fn uuid_from_path(path: &Path) -> Result<String> {
    if !path.is_file() {
        return Err(MatlibError::ModelNotFound(path.to_path_buf()));
    }

    let root = read_document(path)?;
    let kind = detect_kind(&root);
    let body = root
        .get(kind.root_key())
        .ok_or_else(|| MatlibError::invalid_document(path, format!("missing {} root", kind)))?;
    required_field(path, body, kind, "UUID")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_temp_yaml(content: &str) -> NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".yml").tempfile().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_parse_physical_model() {
        let file = write_temp_yaml(
            r#"
Model:
  Name: "Density"
  UUID: "454661e5-265b-4320-8e6f-fcf6223ac3af"
  Density:
    Type: "Quantity"
    Units: "kg/m^3"
"#,
        );
        let entry = parse_document(LibraryId(0), file.path()).unwrap();

        assert_eq!(entry.kind(), ModelKind::Physical);
        assert_eq!(entry.name(), "Density");
        assert_eq!(entry.uuid(), "454661e5-265b-4320-8e6f-fcf6223ac3af");
        assert_eq!(entry.directory(), file.path());
        assert!(!entry.is_dereferenced());
        let props: Vec<_> = entry.properties().map(|(k, _)| k).collect();
        assert_eq!(props, vec!["Density"]);
    }

    #[test]
    fn test_parse_appearance_model() {
        let file = write_temp_yaml(
            r#"
AppearanceModel:
  Name: "Basic Rendering"
  UUID: "f006c7e4-35b7-43d5-bbf9-c5d572309e6e"
  DiffuseColor:
    Type: "Color"
"#,
        );
        let entry = parse_document(LibraryId(0), file.path()).unwrap();
        assert_eq!(entry.kind(), ModelKind::Appearance);
        assert_eq!(entry.name(), "Basic Rendering");
    }

    #[test]
    fn test_missing_uuid_is_invalid() {
        let file = write_temp_yaml(
            r#"
Model:
  Name: "No Id"
"#,
        );
        let result = parse_document(LibraryId(0), file.path());
        assert!(matches!(result, Err(MatlibError::InvalidDocument { .. })));
    }

    #[test]
    fn test_missing_name_is_invalid() {
        let file = write_temp_yaml(
            r#"
Model:
  UUID: "abc"
"#,
        );
        let result = parse_document(LibraryId(0), file.path());
        assert!(matches!(result, Err(MatlibError::InvalidDocument { .. })));
    }

    #[test]
    fn test_unparsable_yaml_is_invalid() {
        let file = write_temp_yaml("Model: [unterminated\n  Name: x");
        let result = parse_document(LibraryId(0), file.path());
        assert!(matches!(result, Err(MatlibError::InvalidDocument { .. })));
    }

    #[test]
    fn test_missing_file() {
        let path = Path::new("/nonexistent/matlib/Missing.yml");
        assert!(matches!(
            parse_document(LibraryId(0), path),
            Err(MatlibError::DocumentNotFound(_))
        ));
        assert!(matches!(
            uuid_from_path(path),
            Err(MatlibError::ModelNotFound(_))
        ));
    }

    #[test]
    fn test_uuid_from_path() {
        let file = write_temp_yaml(
            r#"
AppearanceModel:
  UUID: "only-an-id"
"#,
        );
        assert_eq!(uuid_from_path(file.path()).unwrap(), "only-an-id");
    }

    #[test]
    fn test_inherits_forms() {
        let file = write_temp_yaml(
            r#"
Model:
  Name: "Child"
  UUID: "child"
  Inherits:
    - UUID: "plain"
    - Density:
        UUID: "nested"
    - Broken: "no id here"
"#,
        );
        let entry = parse_document(LibraryId(0), file.path()).unwrap();
        assert_eq!(
            entry.inherits(),
            vec![Some("plain".to_string()), Some("nested".to_string()), None]
        );
        assert!(entry.properties().next().is_none());
    }

    #[test]
    fn test_scalar_coercion() {
        let node: Value = serde_yaml::from_str("{ Units: 3, Flag: true, List: [1] }").unwrap();
        assert_eq!(field_or(&node, "Units", ""), "3");
        assert_eq!(field_or(&node, "Flag", ""), "true");
        assert_eq!(field_or(&node, "List", "none"), "none");
        assert_eq!(field_or(&node, "Absent", ""), "");
    }
}
