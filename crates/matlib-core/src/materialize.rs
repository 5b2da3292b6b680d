//! Conversion of dereferenced entries into typed models

use serde_yaml::Value;

use crate::document::{field_or, RawEntry};
use crate::error::{MatlibError, Result};
use crate::library::ModelLibrary;
use crate::model::{Model, ModelProperty};
use crate::resolver::PropertyOrigins;

/// Build the property fields shared by properties and their columns
fn property_from_node(name: &str, node: &Value) -> ModelProperty {
    ModelProperty::new(
        name,
        field_or(node, "DisplayName", ""),
        field_or(node, "Type", ""),
        field_or(node, "Units", ""),
        field_or(node, "URL", ""),
        field_or(node, "Description", ""),
    )
}

/// Attach the columns of a tabular property, in document order
fn add_columns(property: &mut ModelProperty, node: &Value) {
    let Some(columns) = node.get("Columns").and_then(Value::as_mapping) else {
        return;
    };

    for (key, column) in columns {
        if let Some(name) = key.as_str() {
            property.add_column(property_from_node(name, column));
        }
    }
}

/// Turn a dereferenced entry into a [`Model`]
///
/// The inheritance list is read from the `Inherits` declarations, which merging
/// never modifies. Properties found in `origins`, the entry's own provenance,
/// are tagged with the ancestor they came from.
pub fn materialize(
    entry: &RawEntry,
    library: &ModelLibrary,
    origins: Option<&PropertyOrigins>,
) -> Result<Model> {
    if !library.is_local() {
        return Err(MatlibError::InvalidLibrary(library.name.clone()));
    }
    debug_assert!(entry.is_dereferenced(), "materializing unresolved entry");

    let null = Value::Null;
    let body = entry
        .document()
        .get(entry.kind().root_key())
        .unwrap_or(&null);

    let mut model = Model::new(
        entry.library(),
        entry.kind(),
        entry.name(),
        entry.directory(),
        entry.uuid(),
        field_or(body, "Description", ""),
        field_or(body, "URL", ""),
        field_or(body, "DOI", ""),
    );

    for parent in entry.inherits().into_iter().flatten() {
        model.add_inheritance(parent);
    }

    for (name, node) in entry.properties() {
        let mut property = property_from_node(name, node);
        if property.is_tabular() {
            add_columns(&mut property, node);
        }
        if let Some(ancestor) = origins.and_then(|origins| origins.get(name)) {
            property.set_inheritance(ancestor);
        }
        model.add_property(property);
    }

    Ok(model)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::library::{LibraryId, LibraryLocation, LibrarySource};
    use crate::model::ModelKind;

    fn resolved_entry(yaml: &str) -> RawEntry {
        let root: Value = serde_yaml::from_str(yaml).unwrap();
        let kind = if root.get("AppearanceModel").is_some() {
            ModelKind::Appearance
        } else {
            ModelKind::Physical
        };
        let body = root.get(kind.root_key()).unwrap();
        let uuid = body.get("UUID").and_then(Value::as_str).unwrap().to_string();
        let name = body.get("Name").and_then(Value::as_str).unwrap().to_string();
        let mut entry = RawEntry::new(LibraryId(0), kind, name, "/lib/m.yml", uuid, root);
        entry.mark_dereferenced();
        entry
    }

    fn library() -> ModelLibrary {
        ModelLibrary::local("System", "/lib", LibrarySource::Builtin)
    }

    #[test]
    fn test_metadata_defaults() {
        let entry = resolved_entry(
            r#"
Model:
  Name: "Bare"
  UUID: "bare"
"#,
        );
        let model = materialize(&entry, &library(), None).unwrap();

        assert_eq!(model.kind, ModelKind::Physical);
        assert_eq!(model.name, "Bare");
        assert_eq!(model.description, "");
        assert_eq!(model.url, "");
        assert_eq!(model.doi, "");
        assert!(model.inherits.is_empty());
        assert!(model.properties.is_empty());
    }

    #[test]
    fn test_properties_and_provenance() {
        let entry = resolved_entry(
            r#"
Model:
  Name: "Elastic"
  UUID: "elastic"
  URL: "https://example.org/elastic"
  Description: "Linear elastic"
  DOI: "10.1000/xyz"
  Inherits:
    - UUID: "density"
  YoungsModulus:
    DisplayName: "Young's Modulus"
    Type: "Quantity"
    Units: "kPa"
    Description: "Elastic modulus"
  Density:
    Type: "Quantity"
    Units: "kg/m^3"
"#,
        );
        let origins = PropertyOrigins::from([("Density".to_string(), "density".to_string())]);

        let model = materialize(&entry, &library(), Some(&origins)).unwrap();

        assert_eq!(model.url, "https://example.org/elastic");
        assert_eq!(model.doi, "10.1000/xyz");
        assert_eq!(model.inherits, vec!["density".to_string()]);
        assert_eq!(model.properties.len(), 2);

        let youngs = model.property("YoungsModulus").unwrap();
        assert_eq!(youngs.display_name, "Young's Modulus");
        assert_eq!(youngs.units, "kPa");
        assert_eq!(youngs.url, "");
        assert_eq!(youngs.inherited_from, None);

        let density = model.property("Density").unwrap();
        assert_eq!(density.inherited_from.as_deref(), Some("density"));
    }

    #[test]
    fn test_tabular_columns() {
        let entry = resolved_entry(
            r#"
Model:
  Name: "Stress Strain"
  UUID: "ss"
  StressStrain:
    Type: "2DArray"
    Columns:
      Strain:
        Type: "Quantity"
        Units: ""
        Description: "Strain"
      Stress:
        Type: "Quantity"
        Units: "MPa"
        Description: "Stress at strain"
  Temperature:
    Type: "Quantity"
    Columns:
      Ignored:
        Type: "Quantity"
"#,
        );
        let model = materialize(&entry, &library(), None).unwrap();

        let table = model.property("StressStrain").unwrap();
        let names: Vec<_> = table.columns.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Strain", "Stress"]);
        assert_eq!(table.column("Stress").unwrap().units, "MPa");
        assert_eq!(table.column("Strain").unwrap().description, "Strain");

        // Scalar types never carry columns
        assert!(model.property("Temperature").unwrap().columns.is_empty());
    }

    #[test]
    fn test_remote_library_rejected() {
        let entry = resolved_entry(
            r#"
AppearanceModel:
  Name: "Remote"
  UUID: "remote"
"#,
        );
        let remote = ModelLibrary {
            location: LibraryLocation::Remote {
                url: "https://example.org".to_string(),
            },
            ..library()
        };
        let result = materialize(&entry, &remote, None);
        assert!(matches!(result, Err(MatlibError::InvalidLibrary(_))));
    }
}
