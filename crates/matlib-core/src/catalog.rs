//! The catalog of finalized models, keyed by unique id

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::config::DuplicatePolicy;
use crate::error::{MatlibError, Result};
use crate::model::{Model, ModelKind};

/// Finalized models keyed by unique id
#[derive(Debug, Clone, Default)]
pub struct ModelCatalog {
    models: BTreeMap<String, Arc<Model>>,
    policy: DuplicatePolicy,
}

impl ModelCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_policy(policy: DuplicatePolicy) -> Self {
        Self {
            models: BTreeMap::new(),
            policy,
        }
    }

    pub fn policy(&self) -> DuplicatePolicy {
        self.policy
    }

    /// Check a model id against the duplicate policy without storing anything
    ///
    /// Returns whether [`insert`](Self::insert) would store a model with this
    /// id, or the error it would fail with.
    pub fn admit(&self, uuid: &str, library_name: &str) -> Result<bool> {
        if !self.models.contains_key(uuid) {
            return Ok(true);
        }
        match self.policy {
            DuplicatePolicy::Replace | DuplicatePolicy::WarnReplace => Ok(true),
            DuplicatePolicy::KeepFirst => Ok(false),
            DuplicatePolicy::Error => Err(MatlibError::DuplicateModel {
                uuid: uuid.to_string(),
                library: library_name.to_string(),
            }),
        }
    }

    /// Store a model handle under its id, applying the duplicate policy
    ///
    /// Returns whether the handle was stored.
    pub fn insert(&mut self, model: Arc<Model>, library_name: &str) -> Result<bool> {
        if !self.admit(&model.uuid, library_name)? {
            tracing::debug!("Keeping model {}, ignoring {:?}", model.uuid, model.directory);
            return Ok(false);
        }

        if let Some(existing) = self.models.get(&model.uuid) {
            if self.policy == DuplicatePolicy::WarnReplace {
                tracing::warn!(
                    "Model {} from {:?} replaced by {:?} in library {}",
                    model.uuid,
                    existing.directory,
                    model.directory,
                    library_name
                );
            } else {
                tracing::debug!("Model {} replaced by library {}", model.uuid, library_name);
            }
        }

        self.models.insert(model.uuid.clone(), model);
        Ok(true)
    }

    pub fn get(&self, uuid: &str) -> Option<&Arc<Model>> {
        self.models.get(uuid)
    }

    pub fn contains(&self, uuid: &str) -> bool {
        self.models.contains_key(uuid)
    }

    /// Models in id order
    pub fn iter(&self) -> impl Iterator<Item = &Arc<Model>> {
        self.models.values()
    }

    pub fn by_kind(&self, kind: ModelKind) -> impl Iterator<Item = &Arc<Model>> {
        self.models.values().filter(move |m| m.kind == kind)
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }

    pub fn clear(&mut self) {
        self.models.clear();
    }

    /// Export all models as a JSON array in id order
    pub fn to_json(&self) -> Result<String> {
        let models: Vec<&Model> = self.models.values().map(Arc::as_ref).collect();
        Ok(serde_json::to_string_pretty(&models)?)
    }
}

/// Catalogs are equal when they hold equal models under the same ids
impl PartialEq for ModelCatalog {
    fn eq(&self, other: &Self) -> bool {
        self.models == other.models
    }
}
