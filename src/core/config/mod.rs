//! core::config
//!
//! Configuration schema and loading.
//!
//! # Overview
//!
//! Stagehand reads settings from three places:
//! - **Git config**: `user.*`, `diff.context`, `commit.template`, `gui.*`
//!   and `guitool.<name>.*` entries, read through `git2`
//! - **Global**: the user's TOML file
//! - **Repo**: a TOML file inside the repository's git directory
//!
//! # Precedence
//!
//! Values are resolved in this order (later overrides earlier):
//! 1. Default values (supplied by the caller through [`ConfigSource::get_or`])
//! 2. Git config
//! 3. Global config file
//! 4. Repo config file
//!
//! # Global Config Locations
//!
//! Searched in order:
//! 1. `$STAGEHAND_CONFIG` if set
//! 2. `$XDG_CONFIG_HOME/stagehand/config.toml`
//! 3. `~/.stagehand/config.toml` (canonical write location)
//!
//! # Repo Config Location
//!
//! `<git_dir>/stagehand/config.toml`
//!
//! # Example
//!
//! ```no_run
//! use stagehand::core::config::{Config, ConfigSource};
//! use std::path::Path;
//!
//! let config = Config::load(Some(Path::new("/path/to/repo/.git"))).unwrap();
//! let context = config.get_or("diff.context", "3");
//! println!("diff context: {}", context);
//! ```

pub mod schema;

pub use schema::{ConfigFile, PromptSetting, ToolOptions};

use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors from configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file '{path}': {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config file '{path}': {message}")]
    ParseError { path: PathBuf, message: String },

    #[error("failed to write config file '{path}': {source}")]
    WriteError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid config value: {0}")]
    InvalidValue(String),

    #[error("home directory not found")]
    NoHomeDir,
}

/// Which file a setting is written to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigScope {
    /// The user's global file.
    Global,
    /// The repository file.
    Repo,
}

/// Read/write access to configuration, as seen by commands.
pub trait ConfigSource {
    /// Effective value of a dotted key.
    fn get(&self, key: &str) -> Option<String>;

    /// Effective value of a dotted key, or `default`.
    fn get_or(&self, key: &str, default: &str) -> String {
        self.get(key).unwrap_or_else(|| default.to_string())
    }

    /// Value of a key in one scope only.
    fn scoped(&self, scope: ConfigScope, key: &str) -> Option<String>;

    /// Options of the named tool, if configured.
    fn tool_options(&self, name: &str) -> Option<ToolOptions>;

    /// Set a key in one scope.
    fn set(&mut self, scope: ConfigScope, key: &str, value: &str) -> Result<(), ConfigError>;
}

/// Merged configuration from all sources.
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Git config entries, keyed by their full dotted name
    git: BTreeMap<String, String>,
    /// Global configuration
    pub global: ConfigFile,
    /// Repository configuration (if in a repo)
    pub repo: Option<ConfigFile>,
    /// Where global changes are written
    global_path: Option<PathBuf>,
    /// Where repo changes are written
    repo_path: Option<PathBuf>,
}

impl Config {
    /// Load configuration from default locations.
    ///
    /// If `git_dir` is provided, also loads the repo file.
    ///
    /// # Errors
    ///
    /// Returns an error if config files exist but cannot be parsed.
    /// Missing config files are not an error (defaults are used).
    pub fn load(git_dir: Option<&Path>) -> Result<Config, ConfigError> {
        let global_path = match Self::find_global() {
            Some(path) => Some(path),
            None => Self::global_config_path().ok(),
        };
        Self::load_from(global_path.as_deref(), git_dir)
    }

    /// Load configuration from an explicit global file path.
    ///
    /// The global file does not need to exist; it becomes the write target
    /// for [`ConfigScope::Global`].
    pub fn load_from(global_path: Option<&Path>, git_dir: Option<&Path>) -> Result<Config, ConfigError> {
        let global = match global_path {
            Some(path) if path.exists() => Self::read_config(path)?,
            _ => ConfigFile::default(),
        };

        let (repo, repo_path) = match git_dir {
            Some(dir) => {
                let path = Self::repo_config_path(dir);
                let repo = if path.exists() {
                    Some(Self::read_config(&path)?)
                } else {
                    None
                };
                (repo, Some(path))
            }
            None => (None, None),
        };

        global.validate()?;
        if let Some(ref r) = repo {
            r.validate()?;
        }

        tracing::debug!(
            global = ?global_path,
            repo = ?repo_path,
            "loaded configuration"
        );

        Ok(Config {
            git: BTreeMap::new(),
            global,
            repo,
            global_path: global_path.map(Path::to_path_buf),
            repo_path,
        })
    }

    /// Add git config entries as the lowest-precedence layer.
    pub fn with_git_entries(mut self, entries: impl IntoIterator<Item = (String, String)>) -> Self {
        // Later entries win, matching git's last-one-wins rule.
        for (name, value) in entries {
            self.git.insert(name, value);
        }
        self
    }

    /// Find an existing global config file.
    fn find_global() -> Option<PathBuf> {
        if let Ok(path) = std::env::var("STAGEHAND_CONFIG") {
            let path = PathBuf::from(path);
            if path.exists() {
                return Some(path);
            }
        }

        if let Ok(xdg_home) = std::env::var("XDG_CONFIG_HOME") {
            let path = PathBuf::from(xdg_home).join("stagehand/config.toml");
            if path.exists() {
                return Some(path);
            }
        }

        let path = dirs::home_dir()?.join(".stagehand/config.toml");
        path.exists().then_some(path)
    }

    /// Read and parse a config file.
    fn read_config(path: &Path) -> Result<ConfigFile, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            source: e,
        })?;

        toml::from_str(&contents).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// Get the canonical path for global config.
    ///
    /// Returns `~/.stagehand/config.toml`.
    pub fn global_config_path() -> Result<PathBuf, ConfigError> {
        let home = dirs::home_dir().ok_or(ConfigError::NoHomeDir)?;
        Ok(home.join(".stagehand/config.toml"))
    }

    /// Get the path of the repo config inside `git_dir`.
    pub fn repo_config_path(git_dir: &Path) -> PathBuf {
        git_dir.join("stagehand/config.toml")
    }

    /// Write a config file atomically.
    ///
    /// Creates parent directories if needed, writes a sibling temp file and
    /// renames it over the target.
    fn write_config_atomic(path: &Path, config: &ConfigFile) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| ConfigError::WriteError {
                path: path.to_path_buf(),
                source: e,
            })?;
        }

        let contents =
            toml::to_string_pretty(config).map_err(|e| ConfigError::InvalidValue(e.to_string()))?;

        let temp_path = path.with_extension("toml.tmp");
        let mut file = fs::File::create(&temp_path).map_err(|e| ConfigError::WriteError {
            path: temp_path.clone(),
            source: e,
        })?;

        file.write_all(contents.as_bytes())
            .map_err(|e| ConfigError::WriteError {
                path: temp_path.clone(),
                source: e,
            })?;

        file.sync_all().map_err(|e| ConfigError::WriteError {
            path: temp_path.clone(),
            source: e,
        })?;

        fs::rename(&temp_path, path).map_err(|e| ConfigError::WriteError {
            path: path.to_path_buf(),
            source: e,
        })?;

        Ok(())
    }

    /// Names of all configured tools, sorted.
    pub fn tool_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .git
            .keys()
            .filter_map(|key| key.strip_prefix("guitool."))
            .filter_map(|rest| rest.rsplit_once('.').map(|(name, _)| name.to_string()))
            .chain(self.global.tools.keys().cloned())
            .chain(self.repo.iter().flat_map(|r| r.tools.keys().cloned()))
            .collect();
        names.sort();
        names.dedup();
        names
    }

    fn git_tool(&self, name: &str) -> Option<ToolOptions> {
        let prefix = format!("guitool.{}.", name);
        ToolOptions::from_pairs(
            self.git
                .iter()
                .filter_map(|(key, value)| {
                    key.strip_prefix(&prefix).map(|opt| (opt, value.as_str()))
                })
                .filter(|(opt, _)| !opt.contains('.')),
        )
    }
}

impl ConfigSource for Config {
    fn get(&self, key: &str) -> Option<String> {
        self.repo
            .as_ref()
            .and_then(|r| r.get(key))
            .or_else(|| self.global.get(key))
            .or_else(|| self.git.get(key).cloned())
    }

    fn scoped(&self, scope: ConfigScope, key: &str) -> Option<String> {
        match scope {
            ConfigScope::Global => self.global.get(key),
            ConfigScope::Repo => self.repo.as_ref().and_then(|r| r.get(key)),
        }
    }

    fn tool_options(&self, name: &str) -> Option<ToolOptions> {
        self.repo
            .as_ref()
            .and_then(|r| r.tools.get(name).cloned())
            .or_else(|| self.global.tools.get(name).cloned())
            .or_else(|| self.git_tool(name))
    }

    fn set(&mut self, scope: ConfigScope, key: &str, value: &str) -> Result<(), ConfigError> {
        let (file, path) = match scope {
            ConfigScope::Global => (&mut self.global, self.global_path.as_ref()),
            ConfigScope::Repo => (
                self.repo.get_or_insert_with(ConfigFile::default),
                self.repo_path.as_ref(),
            ),
        };
        file.set(key, value)?;
        if let Some(path) = path {
            Self::write_config_atomic(path, file)?;
            tracing::debug!(key, path = %path.display(), "persisted config value");
        }
        Ok(())
    }
}
