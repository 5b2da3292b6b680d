//! Configuration for matlib-core
//!
//! Decides which library locations take part in a load and how duplicate
//! model ids across libraries are handled.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{MatlibError, Result};

/// Loader configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MaterialConfig {
    /// What to do when a later library redefines a model id
    pub duplicate_policy: DuplicatePolicy,
    /// Library location switches
    pub resources: ResourceConfig,
    /// Modules contributing their own model directories, in registration order
    pub modules: Vec<ModuleResource>,
}

/// Library location switches
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResourceConfig {
    /// Load the models shipped with the host application
    pub use_built_in_materials: bool,
    /// Load models from registered modules
    pub use_materials_from_modules: bool,
    /// Load models from the user's configuration directory
    pub use_materials_from_config_dir: bool,
    /// Load models from `custom_materials_dir`
    pub use_materials_from_custom_dir: bool,
    /// Custom library root, empty when unset
    pub custom_materials_dir: String,
}

impl Default for ResourceConfig {
    fn default() -> Self {
        Self {
            use_built_in_materials: true,
            use_materials_from_modules: true,
            use_materials_from_config_dir: true,
            use_materials_from_custom_dir: true,
            custom_materials_dir: String::new(),
        }
    }
}

/// A module's model library registration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModuleResource {
    pub name: String,
    /// Model directory, empty when the module ships none
    pub model_dir: String,
    pub icon: String,
}

impl ModuleResource {
    pub fn new(name: impl Into<String>, model_dir: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            model_dir: model_dir.into(),
            icon: String::new(),
        }
    }
}

/// Handling of a model id that is already in the catalog
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DuplicatePolicy {
    /// The later model silently replaces the earlier one
    #[default]
    Replace,
    /// The later model replaces the earlier one with a warning
    WarnReplace,
    /// The earlier model is kept
    KeepFirst,
    /// The load fails
    Error,
}

/// Host application locations consulted during discovery
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostPaths {
    /// Application resource directory; the built-in library is `Models` below it
    pub resource_dir: PathBuf,
    /// Per-user application data directory; the user library is `Models` below it
    pub user_data_dir: PathBuf,
}

impl HostPaths {
    pub fn new(resource_dir: impl Into<PathBuf>, user_data_dir: impl Into<PathBuf>) -> Self {
        Self {
            resource_dir: resource_dir.into(),
            user_data_dir: user_data_dir.into(),
        }
    }

    /// Platform defaults under the user's data directory
    pub fn standard() -> Self {
        let base = dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("matlib");
        Self {
            resource_dir: base.join("resources"),
            user_data_dir: base,
        }
    }

    pub fn built_in_models_dir(&self) -> PathBuf {
        self.resource_dir.join("Models")
    }

    pub fn user_models_dir(&self) -> PathBuf {
        self.user_data_dir.join("Models")
    }
}

impl MaterialConfig {
    /// Create a new configuration with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Load configuration from a TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self> {
        Ok(toml::from_str(toml_str)?)
    }

    /// Serialize configuration to TOML
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| MatlibError::Config(e.to_string()))
    }

    /// Load configuration from a JSON string
    pub fn from_json(json_str: &str) -> Result<Self> {
        Ok(serde_json::from_str(json_str)?)
    }

    /// Serialize configuration to JSON
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Load configuration from a `.toml` or `.json` file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config = match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Self::from_json(&content)?,
            _ => Self::from_toml(&content)?,
        };
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for module in &self.modules {
            if module.name.trim().is_empty() {
                return Err(MatlibError::Config(
                    "module entries must have a name".to_string(),
                ));
            }
            if !seen.insert(module.name.as_str()) {
                return Err(MatlibError::Config(format!(
                    "module '{}' is registered twice",
                    module.name
                )));
            }
        }

        Ok(())
    }
}
