use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Environment variable overriding the database location
pub const DATABASE_ENV_VAR: &str = "STAMPS_DB_PATH";

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct StampsConfig {
    pub database: Option<String>,
}

pub fn default_config_path() -> PathBuf {
    PathBuf::from("stamps.toml")
}

pub fn default_database_path() -> PathBuf {
    PathBuf::from("database").join("stamps.db")
}

pub fn load_config(path: Option<&Path>) -> anyhow::Result<Option<StampsConfig>> {
    let path = path.map(Path::to_path_buf).unwrap_or_else(default_config_path);
    if !path.exists() {
        return Ok(None);
    }

    let contents = std::fs::read_to_string(&path)
        .with_context(|| format!("unable to read config {}", path.display()))?;
    let config: StampsConfig = toml::from_str(&contents)
        .with_context(|| format!("invalid config {}", path.display()))?;
    Ok(Some(config))
}

pub fn write_config(path: &Path, config: &StampsConfig, force: bool) -> anyhow::Result<()> {
    if path.exists() && !force {
        anyhow::bail!("config already exists at {} (use --force to overwrite)", path.display());
    }

    let contents = toml::to_string_pretty(config)?;
    std::fs::write(path, contents)?;
    Ok(())
}

/// Value of `STAMPS_DB_PATH`, ignoring an empty setting
pub fn database_path_from_env() -> Option<String> {
    std::env::var(DATABASE_ENV_VAR)
        .ok()
        .filter(|v| !v.trim().is_empty())
}

/// Pick the database path: explicit flag, then environment, then config file,
/// then `database/stamps.db`.
pub fn resolve_database_path(
    flag: Option<&Path>,
    env: Option<&str>,
    config: Option<&StampsConfig>,
) -> PathBuf {
    if let Some(path) = flag {
        return path.to_path_buf();
    }
    if let Some(path) = env {
        return PathBuf::from(path);
    }
    config
        .and_then(|c| c.database.as_deref())
        .map(PathBuf::from)
        .unwrap_or_else(default_database_path)
}

pub fn ensure_db_dir(db_path: &Path) -> crate::Result<()> {
    if let Some(parent) = db_path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}
