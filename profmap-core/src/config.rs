//! Configuration file support for profmap
//!
//! Loads optional settings from JSON files.
//!
//! Search order:
//! 1. Explicit path (--config CLI flag)
//! 2. `.profmaprc.json` in the working directory
//! 3. `profmap.config.json` in the working directory
//! 4. `"profmap"` key in `package.json`
//!
//! All fields are optional. CLI flags take precedence over config file values.

use crate::error::{Error, Result};
use crate::lookup::LookupOptions;
use crate::rewrite::RewriteOptions;
use crate::search::{ANONYMOUS, DEFAULT_MAX_DEPTH};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// profmap configuration loaded from a JSON config file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProfmapConfig {
    /// Directory that relative trace urls are resolved against
    #[serde(default)]
    pub source_root: Option<PathBuf>,

    /// Bound on syntax tree depth visited by the name search (default: 2048)
    #[serde(default)]
    pub max_depth: Option<usize>,

    /// Event name that marks a frame for renaming (default: "anonymous")
    #[serde(default)]
    pub sentinel: Option<String>,

    /// Parse and resolve files in parallel (default: true)
    #[serde(default)]
    pub parallel: Option<bool>,
}

/// Configuration with defaults applied
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedConfig {
    pub source_root: Option<PathBuf>,
    pub max_depth: usize,
    pub sentinel: String,
    pub parallel: bool,
    /// Path the config was loaded from (None if defaults)
    pub config_path: Option<PathBuf>,
}

impl ProfmapConfig {
    /// Validate the configuration for logical errors
    pub fn validate(&self) -> Result<()> {
        if self.max_depth == Some(0) {
            return Err(Error::Config("max_depth must be positive (got 0)".to_string()));
        }
        if let Some(sentinel) = &self.sentinel {
            if sentinel.trim().is_empty() {
                return Err(Error::Config("sentinel must not be empty".to_string()));
            }
        }
        Ok(())
    }

    /// Resolve config into its final form
    pub fn resolve(&self) -> Result<ResolvedConfig> {
        self.validate()?;

        Ok(ResolvedConfig {
            source_root: self.source_root.clone(),
            max_depth: self.max_depth.unwrap_or(DEFAULT_MAX_DEPTH),
            sentinel: self.sentinel.clone().unwrap_or_else(|| ANONYMOUS.to_string()),
            parallel: self.parallel.unwrap_or(true),
            config_path: None,
        })
    }
}

impl ResolvedConfig {
    /// Build a ResolvedConfig with all defaults (no config file)
    pub fn defaults() -> Self {
        ResolvedConfig {
            source_root: None,
            max_depth: DEFAULT_MAX_DEPTH,
            sentinel: ANONYMOUS.to_string(),
            parallel: true,
            config_path: None,
        }
    }

    pub fn lookup_options(&self) -> LookupOptions {
        LookupOptions {
            max_depth: self.max_depth,
        }
    }

    pub fn rewrite_options(&self) -> RewriteOptions {
        RewriteOptions {
            sentinel: self.sentinel.clone(),
            lookup: self.lookup_options(),
            parallel: self.parallel,
        }
    }
}

/// Discover and load a config file from a directory
///
/// Returns `None` if no config file is found (use defaults).
pub fn discover_config(dir: &Path) -> Result<Option<(ProfmapConfig, PathBuf)>> {
    for name in [".profmaprc.json", "profmap.config.json"] {
        let path = dir.join(name);
        if path.exists() {
            let config = load_config_file(&path)?;
            return Ok(Some((config, path)));
        }
    }

    let pkg_path = dir.join("package.json");
    if pkg_path.exists() {
        if let Some(config) = load_from_package_json(&pkg_path)? {
            return Ok(Some((config, pkg_path)));
        }
    }

    Ok(None)
}

/// Load config from an explicit file path
pub fn load_config_file(path: &Path) -> Result<ProfmapConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| Error::io(path, e))?;

    let config: ProfmapConfig = serde_json::from_str(&content).map_err(|e| Error::Json {
        path: path.to_path_buf(),
        source: e,
    })?;
    config.validate()?;

    Ok(config)
}

/// Load profmap config from the "profmap" key in package.json
fn load_from_package_json(path: &Path) -> Result<Option<ProfmapConfig>> {
    let content = std::fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
    let json_error = |e| Error::Json {
        path: path.to_path_buf(),
        source: e,
    };

    let pkg: serde_json::Value = serde_json::from_str(&content).map_err(json_error)?;

    match pkg.get("profmap") {
        Some(value) => {
            let config: ProfmapConfig =
                serde_json::from_value(value.clone()).map_err(json_error)?;
            config.validate()?;
            Ok(Some(config))
        }
        None => Ok(None),
    }
}

/// Load and resolve config
///
/// If `config_path` is provided, loads from that file.
/// Otherwise, discovers config in `dir`.
/// Returns default config if nothing is found.
pub fn load_and_resolve(dir: &Path, config_path: Option<&Path>) -> Result<ResolvedConfig> {
    let (config, source_path) = if let Some(path) = config_path {
        let config = load_config_file(path)?;
        (config, Some(path.to_path_buf()))
    } else {
        match discover_config(dir)? {
            Some((config, path)) => (config, Some(path)),
            None => (ProfmapConfig::default(), None),
        }
    };

    let mut resolved = config.resolve()?;
    resolved.config_path = source_path;
    Ok(resolved)
}
