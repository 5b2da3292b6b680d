//! Recursive discovery of model documents under a library root

use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::document::DOCUMENT_EXTENSION;

/// Lazy walk over the model documents below one root
///
/// Entries are visited in file-name order so that repeated walks of the same
/// tree yield the same sequence. Unreadable directories are logged and
/// skipped.
pub struct DocumentWalk {
    inner: walkdir::IntoIter,
}

impl Iterator for DocumentWalk {
    type Item = PathBuf;

    fn next(&mut self) -> Option<PathBuf> {
        loop {
            match self.inner.next()? {
                Ok(entry) => {
                    if entry.file_type().is_file() && is_model_document(entry.path()) {
                        return Some(entry.into_path());
                    }
                }
                Err(err) => {
                    tracing::warn!("Skipping unreadable library entry: {}", err);
                }
            }
        }
    }
}

/// Enumerate the model documents under `root`
pub fn enumerate_documents(root: &Path) -> DocumentWalk {
    DocumentWalk {
        inner: WalkDir::new(root)
            .follow_links(true)
            .sort_by_file_name()
            .into_iter(),
    }
}

/// Whether a path carries the model document extension
pub fn is_model_document(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext == DOCUMENT_EXTENSION)
        .unwrap_or(false)
}
