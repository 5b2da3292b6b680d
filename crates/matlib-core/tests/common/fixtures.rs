//! On-disk library fixtures

use std::fs;
use std::path::{Path, PathBuf};

use matlib_core::{LibrarySource, ModelLibrary};
use tempfile::TempDir;

/// A temporary library directory
pub struct LibraryFixture {
    dir: TempDir,
    name: String,
}

impl LibraryFixture {
    pub fn new(name: &str) -> Self {
        Self {
            dir: tempfile::tempdir().unwrap(),
            name: name.to_string(),
        }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Write a document at `relative`, creating parent directories
    pub fn write(&self, relative: &str, content: &str) -> PathBuf {
        let path = self.dir.path().join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(&path, content).unwrap();
        path
    }

    /// Write a physical model document with the given extra YAML body lines
    pub fn model(&self, relative: &str, uuid: &str, name: &str, body: &str) -> PathBuf {
        self.write(
            relative,
            &format!(
                "Model:\n  Name: \"{}\"\n  UUID: \"{}\"\n{}",
                name,
                uuid,
                indent(body)
            ),
        )
    }

    pub fn library(&self, source: LibrarySource) -> ModelLibrary {
        ModelLibrary::local(self.name.clone(), self.dir.path(), source)
    }
}

/// Indent every non-empty line by two spaces so it lands under the root key
fn indent(body: &str) -> String {
    body.lines()
        .filter(|l| !l.trim().is_empty())
        .map(|l| format!("  {}\n", l))
        .collect()
}

/// `Inherits` block referencing the given parent ids
pub fn inherits(parents: &[&str]) -> String {
    let mut out = String::from("Inherits:\n");
    for parent in parents {
        out.push_str(&format!("  - UUID: \"{}\"\n", parent));
    }
    out
}

/// A scalar property block
pub fn property(name: &str, property_type: &str, units: &str) -> String {
    format!(
        "{}:\n  DisplayName: \"{}\"\n  Type: \"{}\"\n  Units: \"{}\"\n  Description: \"{} description\"\n",
        name, name, property_type, units, name
    )
}
