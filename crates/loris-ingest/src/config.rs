//! Run configuration loading.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use loris_model::{ConfigError, IngestConfig};

/// Environment variable naming the config file when no path is given.
pub const CONFIG_ENV_VAR: &str = "LORIS_INGEST_CONFIG";
/// Overrides `api.username` from the config file.
pub const USERNAME_ENV_VAR: &str = "LORIS_API_USERNAME";
/// Overrides `api.password` from the config file.
pub const PASSWORD_ENV_VAR: &str = "LORIS_API_PASSWORD";

const DEFAULT_CONFIG_PATH: &str = "config/loris.json";

/// Resolve the config path: explicit flag, then environment, then default.
pub fn resolve_config_path(explicit: Option<&Path>) -> PathBuf {
    if let Some(path) = explicit {
        return path.to_path_buf();
    }
    if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
        return PathBuf::from(path);
    }
    PathBuf::from(DEFAULT_CONFIG_PATH)
}

/// Load, apply environment overrides and validate the configuration.
///
/// The format follows the extension: `.toml` is TOML, anything else JSON.
pub fn load_config(path: &Path) -> Result<IngestConfig, ConfigError> {
    let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let mut config = parse_config(path, &contents)?;
    apply_env_overrides(&mut config);
    validate_config(&config)?;
    Ok(config)
}

fn parse_config(path: &Path, contents: &str) -> Result<IngestConfig, ConfigError> {
    let is_toml = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("toml"));
    if is_toml {
        toml::from_str(contents).map_err(|e| ConfigError::Toml {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    } else {
        serde_json::from_str(contents).map_err(|e| ConfigError::Json {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }
}

fn apply_env_overrides(config: &mut IngestConfig) {
    if let Ok(username) = std::env::var(USERNAME_ENV_VAR) {
        config.api.username = username;
    }
    if let Ok(password) = std::env::var(PASSWORD_ENV_VAR) {
        config.api.password = password;
    }
}

/// Check invariants the rest of the run relies on.
pub fn validate_config(config: &IngestConfig) -> Result<(), ConfigError> {
    if config.api.base_url.trim().is_empty() {
        return Err(ConfigError::Invalid {
            message: "api.base_url must not be empty".to_string(),
        });
    }
    let mut seen = BTreeSet::new();
    for collection in &config.collections {
        if !seen.insert(collection.name.as_str()) {
            return Err(ConfigError::Invalid {
                message: format!("duplicate collection name '{}'", collection.name),
            });
        }
    }
    Ok(())
}
