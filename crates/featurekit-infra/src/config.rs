//! Engine configuration loader for featurekit.
//!
//! Reads `config.toml` from the featurekit directory (`~/.featurekit/` by
//! default) and deserializes it into [`EngineConfig`]. Falls back to
//! defaults when the file is missing or malformed.

use std::path::{Path, PathBuf};

use featurekit_types::config::EngineConfig;

/// Resolve the featurekit directory from environment or platform defaults.
///
/// Priority:
/// 1. `FEATUREKIT_DIR` environment variable
/// 2. `~/.featurekit`
/// 3. `.featurekit` in the current directory
pub fn resolve_config_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("FEATUREKIT_DIR") {
        return PathBuf::from(dir);
    }

    if let Some(home) = dirs::home_dir() {
        return home.join(".featurekit");
    }

    PathBuf::from(".featurekit")
}

/// Load engine configuration from `{dir}/config.toml`.
///
/// - If the file does not exist, returns [`EngineConfig::default()`].
/// - If the file exists but fails to parse, logs a warning and returns the default.
/// - If the file exists and parses successfully, returns the parsed config.
pub async fn load_engine_config(dir: &Path) -> EngineConfig {
    let config_path = dir.join("config.toml");

    let content = match tokio::fs::read_to_string(&config_path).await {
        Ok(content) => content,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!("No config.toml found at {}, using defaults", config_path.display());
            return EngineConfig::default();
        }
        Err(err) => {
            tracing::warn!("Failed to read {}: {err}, using defaults", config_path.display());
            return EngineConfig::default();
        }
    };

    match toml::from_str::<EngineConfig>(&content) {
        Ok(config) => {
            if config.max_chain_depth == 0 {
                tracing::warn!(
                    "max_chain_depth = 0 in {} rejects every class, using default",
                    config_path.display()
                );
                return EngineConfig {
                    max_chain_depth: EngineConfig::default().max_chain_depth,
                    ..config
                };
            }
            config
        }
        Err(err) => {
            tracing::warn!(
                "Failed to parse {}: {err}, using defaults",
                config_path.display()
            );
            EngineConfig::default()
        }
    }
}
