//! Configuration loading
//!
//! Settings come from three layers, weakest first: `cadastro.toml`,
//! `CADASTRO_*` environment variables, CLI flags. The binary resolves
//! them in that order and hands the result to the library as plain
//! values; nothing in here is global state.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct CadastroConfig {
    /// Path to the SQLite database file
    pub database: Option<String>,
    /// HTTP listen port
    pub port: Option<u16>,
    /// Directory served as the static frontend
    pub public_dir: Option<String>,
    /// Field-set variant: "minimal" or "extended"
    pub schema: Option<String>,
}

pub fn default_config_path() -> PathBuf {
    PathBuf::from("cadastro.toml")
}

pub fn default_database_path() -> PathBuf {
    PathBuf::from("cadastro.db")
}

pub fn load_config(path: Option<&Path>) -> anyhow::Result<Option<CadastroConfig>> {
    let path = path.map(Path::to_path_buf).unwrap_or_else(default_config_path);
    if !path.exists() {
        return Ok(None);
    }

    let contents = std::fs::read_to_string(&path)?;
    let config: CadastroConfig = toml::from_str(&contents)?;
    Ok(Some(config))
}

/// Overlay `CADASTRO_*` environment variables onto a loaded config
pub fn apply_env(config: &mut CadastroConfig) {
    if let Ok(database) = std::env::var("CADASTRO_DATABASE") {
        config.database = Some(database);
    }
    if let Ok(port) = std::env::var("CADASTRO_PORT") {
        if let Ok(port) = port.parse() {
            config.port = Some(port);
        } else {
            tracing::warn!("ignoring unparseable CADASTRO_PORT: {}", port);
        }
    }
    if let Ok(dir) = std::env::var("CADASTRO_PUBLIC_DIR") {
        config.public_dir = Some(dir);
    }
    if let Ok(schema) = std::env::var("CADASTRO_SCHEMA") {
        config.schema = Some(schema);
    }
}

pub fn ensure_db_dir(db_path: &Path) -> anyhow::Result<()> {
    if let Some(parent) = db_path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}
