//! Engine configuration types for featurekit.
//!
//! `EngineConfig` represents the top-level `config.toml` that tunes how the
//! composition engine treats deep chains and dangling overrides.

use serde::{Deserialize, Serialize};

/// Top-level configuration for the composition engine.
///
/// Loaded from `{dir}/config.toml`. All fields have sensible defaults.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct EngineConfig {
    /// Maximum number of classes in one ancestor chain (leaf included).
    #[serde(default = "default_max_chain_depth")]
    pub max_chain_depth: usize,

    /// Treat an override naming a feature nobody provides as an error
    /// instead of a logged diagnostic.
    #[serde(default)]
    pub strict_overrides: bool,
}

fn default_max_chain_depth() -> usize {
    64
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_chain_depth: default_max_chain_depth(),
            strict_overrides: false,
        }
    }
}
