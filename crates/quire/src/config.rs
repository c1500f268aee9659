//! Optional `quire.toml` configuration.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use quire_static::SitePaths;
use serde::Deserialize;

/// Name of the config file looked up in the working directory.
pub const CONFIG_FILE: &str = "quire.toml";

/// Configuration file structure (quire.toml).
#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    #[serde(default)]
    pub paths: PathsConfig,
    #[serde(default)]
    pub log: LogConfig,
}

/// Fallback paths used when no valid command-line override is given.
#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct PathsConfig {
    pub template: Option<PathBuf>,
    pub input: Option<PathBuf>,
    pub output: Option<PathBuf>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LogConfig {
    #[serde(default = "default_level")]
    pub level: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
        }
    }
}

fn default_level() -> String {
    "info".to_string()
}

impl ConfigFile {
    /// Built-in paths with any configured replacements applied.
    pub fn default_paths(&self) -> SitePaths {
        let builtin = SitePaths::default();
        SitePaths {
            template_file: self.paths.template.clone().unwrap_or(builtin.template_file),
            input_dir: self.paths.input.clone().unwrap_or(builtin.input_dir),
            output_dir: self.paths.output.clone().unwrap_or(builtin.output_dir),
        }
    }
}

/// Load configuration from quire.toml in `dir` if it exists.
/// Returns an error if the config file exists but is malformed.
pub fn load_config(dir: &Path) -> Result<ConfigFile> {
    let config_path = dir.join(CONFIG_FILE);
    if !config_path.exists() {
        return Ok(ConfigFile::default());
    }

    let content = fs::read_to_string(&config_path)
        .with_context(|| format!("Failed to read {}", config_path.display()))?;
    let config: ConfigFile = toml::from_str(&content)
        .with_context(|| format!("Failed to parse {}", config_path.display()))?;

    Ok(config)
}
