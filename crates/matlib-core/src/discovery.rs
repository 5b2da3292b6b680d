//! Library discovery
//!
//! Libraries are listed in a fixed order: built-in, modules, user, custom.
//! That order is the load order, so with the default duplicate policy a later
//! library's model replaces an earlier one with the same id.

use std::path::PathBuf;

use crate::config::{HostPaths, MaterialConfig};
use crate::library::{LibrarySource, ModelLibrary};

const BUILTIN_ICON: &str = ":/icons/materials.svg";
const USER_ICON: &str = ":/icons/preferences-general.svg";
const CUSTOM_ICON: &str = ":/icons/user.svg";

/// List the model libraries enabled by `config`
///
/// The built-in root is always listed when enabled; module, user and custom
/// roots are only listed if they exist on disk.
pub fn discover_libraries(config: &MaterialConfig, host: &HostPaths) -> Vec<ModelLibrary> {
    let resources = &config.resources;
    let mut libraries = Vec::new();

    if resources.use_built_in_materials {
        libraries.push(
            ModelLibrary::local("System", host.built_in_models_dir(), LibrarySource::Builtin)
                .with_icon(BUILTIN_ICON),
        );
    }

    if resources.use_materials_from_modules {
        for module in &config.modules {
            if module.model_dir.is_empty() {
                continue;
            }
            let dir = PathBuf::from(&module.model_dir);
            if dir.is_dir() {
                libraries.push(
                    ModelLibrary::local(module.name.clone(), dir, LibrarySource::Module)
                        .with_icon(module.icon.clone()),
                );
            } else {
                tracing::debug!(
                    "Module {} model directory {:?} does not exist",
                    module.name,
                    dir
                );
            }
        }
    }

    if resources.use_materials_from_config_dir {
        let dir = host.user_models_dir();
        if dir.is_dir() {
            libraries.push(
                ModelLibrary::local("User", dir, LibrarySource::User).with_icon(USER_ICON),
            );
        }
    }

    if resources.use_materials_from_custom_dir && !resources.custom_materials_dir.is_empty() {
        let dir = PathBuf::from(&resources.custom_materials_dir);
        if dir.is_dir() {
            libraries.push(
                ModelLibrary::local("Custom", dir, LibrarySource::Custom).with_icon(CUSTOM_ICON),
            );
        } else {
            tracing::debug!("Custom model directory {:?} does not exist", dir);
        }
    }

    libraries
}
