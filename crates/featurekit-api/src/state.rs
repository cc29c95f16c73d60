//! Application state shared by every CLI command.
//!
//! Holds the feature manager, configured from the featurekit directory's
//! `config.toml`, that every command registers classes with.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context};
use featurekit_core::{FeatureManager, HostClass, ModuleCatalog};
use featurekit_infra::config::{load_engine_config, resolve_config_dir};
use featurekit_infra::declaration::{load_hierarchy, LoadedHierarchy};

pub struct AppState {
    pub manager: FeatureManager,
}

impl AppState {
    /// Load the engine config from `dir` (or the default directory).
    pub async fn init(dir: Option<PathBuf>) -> anyhow::Result<Self> {
        let dir = dir.unwrap_or_else(resolve_config_dir);
        let config = load_engine_config(&dir).await;
        tracing::debug!(
            dir = %dir.display(),
            max_chain_depth = config.max_chain_depth,
            strict_overrides = config.strict_overrides,
            "Engine config loaded"
        );

        Ok(Self {
            manager: FeatureManager::new(config),
        })
    }

    /// Load and link a declaration file.
    pub async fn load(&self, file: &Path) -> anyhow::Result<LoadedHierarchy> {
        load_hierarchy(file, ModuleCatalog::new())
            .await
            .with_context(|| format!("Failed to load declarations from {}", file.display()))
    }
}

/// Look up a class, listing the available ones when it is missing.
pub fn find_class<'a>(
    hierarchy: &'a LoadedHierarchy,
    name: &str,
) -> anyhow::Result<&'a Arc<HostClass>> {
    match hierarchy.class(name) {
        Some(class) => Ok(class),
        None => bail!(
            "Class '{}' not found. Declared classes: {}",
            name,
            hierarchy.names().join(", ")
        ),
    }
}
