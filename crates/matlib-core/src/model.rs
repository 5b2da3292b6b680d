//! Finalized model entities
//!
//! A [`Model`] is built once its document has been fully dereferenced and is
//! immutable from then on. Properties carry their column schema when tabular
//! and record the ancestor they were inherited from.

use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::library::LibraryId;

/// Property type tags that carry a column schema
pub const TABULAR_TYPES: &[&str] = &["2DArray", "3DArray"];

/// Base kind of a model document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ModelKind {
    /// Physical property model, rooted at `Model`
    Physical,
    /// Appearance model, rooted at `AppearanceModel`
    Appearance,
}

impl ModelKind {
    /// Root key of documents of this kind
    pub fn root_key(&self) -> &'static str {
        match self {
            ModelKind::Physical => "Model",
            ModelKind::Appearance => "AppearanceModel",
        }
    }
}

impl fmt::Display for ModelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.root_key())
    }
}

/// A single property declared by (or inherited into) a model
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelProperty {
    pub name: String,
    pub display_name: String,
    pub property_type: String,
    pub units: String,
    pub url: String,
    pub description: String,
    /// Ancestor model id this property was inherited from
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inherited_from: Option<String>,
    /// Column schema, only populated for tabular types
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub columns: Vec<ModelProperty>,
}

impl ModelProperty {
    pub fn new(
        name: impl Into<String>,
        display_name: impl Into<String>,
        property_type: impl Into<String>,
        units: impl Into<String>,
        url: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            display_name: display_name.into(),
            property_type: property_type.into(),
            units: units.into(),
            url: url.into(),
            description: description.into(),
            inherited_from: None,
            columns: Vec::new(),
        }
    }

    /// Whether the type tag is `2DArray` or `3DArray`
    pub fn is_tabular(&self) -> bool {
        TABULAR_TYPES.contains(&self.property_type.as_str())
    }

    pub fn is_inherited(&self) -> bool {
        self.inherited_from.is_some()
    }

    pub fn set_inheritance(&mut self, ancestor: impl Into<String>) {
        self.inherited_from = Some(ancestor.into());
    }

    pub fn add_column(&mut self, column: ModelProperty) {
        self.columns.push(column);
    }

    pub fn column(&self, name: &str) -> Option<&ModelProperty> {
        self.columns.iter().find(|c| c.name == name)
    }
}

/// A fully resolved catalog entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Model {
    pub library: LibraryId,
    pub kind: ModelKind,
    pub name: String,
    /// Location of the source document
    pub directory: PathBuf,
    pub uuid: String,
    pub description: String,
    pub url: String,
    pub doi: String,
    /// Declared parent ids, in document order
    pub inherits: Vec<String>,
    pub properties: BTreeMap<String, ModelProperty>,
}

impl Model {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        library: LibraryId,
        kind: ModelKind,
        name: impl Into<String>,
        directory: impl Into<PathBuf>,
        uuid: impl Into<String>,
        description: impl Into<String>,
        url: impl Into<String>,
        doi: impl Into<String>,
    ) -> Self {
        Self {
            library,
            kind,
            name: name.into(),
            directory: directory.into(),
            uuid: uuid.into(),
            description: description.into(),
            url: url.into(),
            doi: doi.into(),
            inherits: Vec::new(),
            properties: BTreeMap::new(),
        }
    }

    pub fn add_inheritance(&mut self, parent: impl Into<String>) {
        self.inherits.push(parent.into());
    }

    /// Add a property, replacing any existing property of the same name
    pub fn add_property(&mut self, property: ModelProperty) {
        self.properties.insert(property.name.clone(), property);
    }

    pub fn property(&self, name: &str) -> Option<&ModelProperty> {
        self.properties.get(name)
    }

    pub fn has_property(&self, name: &str) -> bool {
        self.properties.contains_key(name)
    }

    /// Properties declared directly on this model
    pub fn local_properties(&self) -> impl Iterator<Item = &ModelProperty> {
        self.properties.values().filter(|p| !p.is_inherited())
    }

    /// Properties merged in from an ancestor
    pub fn inherited_properties(&self) -> impl Iterator<Item = &ModelProperty> {
        self.properties.values().filter(|p| p.is_inherited())
    }
}
