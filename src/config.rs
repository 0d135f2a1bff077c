//! Configuration - analysis settings and the `pycograph.toml` file
//!
//! `Settings` is passed explicitly into the project resolver and carried by
//! its result; nothing reads configuration from global state.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default number of import resolution passes.
pub const DEFAULT_IMPORT_RESOLUTION_PASSES: usize = 3;

/// Settings that influence parsing and resolution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Record the test type (e.g. `unit`, `integration`) of test objects
    pub determine_test_types: bool,
    /// Upper bound of passes over the unresolved imports
    pub import_resolution_passes: usize,
    /// Extra gitignore-style patterns excluded from discovery
    pub exclude: Vec<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            determine_test_types: false,
            import_resolution_passes: DEFAULT_IMPORT_RESOLUTION_PASSES,
            exclude: Vec::new(),
        }
    }
}

/// Contents of a `pycograph.toml` file. Every value is optional; command
/// line flags take precedence.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct PycographConfig {
    pub project_dir: Option<String>,
    pub graph_name: Option<String>,
    pub database: Option<String>,
    pub overwrite: Option<bool>,
    pub analysis: Option<Settings>,
}

pub fn default_config_path() -> PathBuf {
    PathBuf::from("pycograph.toml")
}

pub fn default_database_path() -> PathBuf {
    PathBuf::from("pycograph.db")
}

/// Read the config file at `path`, or `pycograph.toml` when no path is
/// given. Only the default file may be absent.
pub fn load_config(path: Option<&Path>) -> Result<Option<PycographConfig>> {
    let path = match path {
        Some(path) if !path.exists() => {
            return Err(Error::Config(format!("Config file {} not found", path.display())));
        }
        Some(path) => path.to_path_buf(),
        None => {
            let path = default_config_path();
            if !path.exists() {
                return Ok(None);
            }
            path
        }
    };

    let contents = std::fs::read_to_string(&path)?;
    let config: PycographConfig = toml::from_str(&contents)
        .map_err(|e| Error::Config(format!("Invalid config file {}: {}", path.display(), e)))?;
    tracing::debug!("Loaded config from {}", path.display());
    Ok(Some(config))
}

/// The project directory, defaulting to the current directory
pub fn resolve_project_dir(project_dir: Option<&str>) -> anyhow::Result<PathBuf> {
    match project_dir.filter(|dir| !dir.is_empty()) {
        Some(dir) => Ok(PathBuf::from(dir)),
        None => Ok(std::env::current_dir()?),
    }
}

/// The graph name, defaulting to the project directory's base name
pub fn resolve_graph_name(graph_name: Option<&str>, project_dir: &Path) -> String {
    if let Some(name) = graph_name.filter(|name| !name.is_empty()) {
        return name.to_string();
    }
    let dir = project_dir
        .canonicalize()
        .unwrap_or_else(|_| project_dir.to_path_buf());
    dir.file_name()
        .and_then(|name| name.to_str())
        .unwrap_or("pycograph")
        .to_string()
}

pub fn ensure_db_dir(db_path: &Path) -> anyhow::Result<()> {
    if let Some(parent) = db_path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}
