//! Configuration handling
//!
//! Configuration is optional. It is looked up as `.tidytodo.toml` next to
//! the todo file first, then as `config.toml` in the user config dir
//! (`~/.config/tidytodo` on Linux). A missing file means defaults; a
//! malformed file is an error.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::{Levels, SortMode};

/// File name looked up next to the todo document
const LOCAL_CONFIG_NAME: &str = ".tidytodo.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Defaults applied when the command line leaves them unset
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Grouping key used when `--by` is not given
    pub default_mode: SortMode,

    /// Header nesting depth (1 or 2) used when `--levels` is not given
    pub default_levels: u8,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_mode: SortMode::Project,
            default_levels: 1,
        }
    }
}

impl Config {
    /// Loads the config that applies to a todo file, falling back to
    /// defaults when no config file exists.
    pub fn load_for(todo_path: &Path) -> Result<Self> {
        match Self::find_config_file(todo_path) {
            Some(path) => Self::load(&path),
            None => Ok(Self::default()),
        }
    }

    /// Loads and validates a specific config file
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config: {}", path.display()))?;

        config.validate()?;
        Ok(config)
    }

    /// The nesting depth as a [`Levels`] value
    pub fn levels(&self) -> Levels {
        Levels::from_number(self.default_levels).unwrap_or_default()
    }

    fn validate(&self) -> Result<()> {
        if Levels::from_number(self.default_levels).is_none() {
            return Err(ConfigError::Invalid(format!(
                "default_levels must be 1 or 2, got {}",
                self.default_levels
            ))
            .into());
        }
        Ok(())
    }

    fn find_config_file(todo_path: &Path) -> Option<PathBuf> {
        if let Some(dir) = todo_path.parent() {
            let local = dir.join(LOCAL_CONFIG_NAME);
            if local.is_file() {
                return Some(local);
            }
        }

        let dirs = ProjectDirs::from("", "", "tidytodo")?;
        let global = dirs.config_dir().join("config.toml");
        global.is_file().then_some(global)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn defaults_apply_without_a_config_file() {
        let dir = TempDir::new().unwrap();
        let config = Config::load_for(&dir.path().join("todo.txt")).unwrap();

        assert_eq!(config.default_mode, SortMode::Project);
        assert_eq!(config.levels(), Levels::One);
    }

    #[test]
    fn local_config_overrides_defaults() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join(LOCAL_CONFIG_NAME),
            "default_mode = \"context\"\ndefault_levels = 2\n",
        )
        .unwrap();

        let config = Config::load_for(&dir.path().join("todo.txt")).unwrap();
        assert_eq!(config.default_mode, SortMode::Context);
        assert_eq!(config.levels(), Levels::Two);
    }

    #[test]
    fn partial_config_keeps_remaining_defaults() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(LOCAL_CONFIG_NAME), "default_levels = 2\n").unwrap();

        let config = Config::load_for(&dir.path().join("todo.txt")).unwrap();
        assert_eq!(config.default_mode, SortMode::Project);
        assert_eq!(config.levels(), Levels::Two);
    }

    #[test]
    fn out_of_range_levels_is_rejected() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(LOCAL_CONFIG_NAME), "default_levels = 3\n").unwrap();

        assert!(Config::load_for(&dir.path().join("todo.txt")).is_err());
    }

    #[test]
    fn malformed_toml_is_rejected() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(LOCAL_CONFIG_NAME), "default_mode = [").unwrap();

        assert!(Config::load_for(&dir.path().join("todo.txt")).is_err());
    }
}
