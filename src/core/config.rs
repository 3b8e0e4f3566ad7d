//! User configuration (`~/.aipaca.yaml`).
//!
//! The config is loaded once per invocation and passed explicitly into every
//! operation. Missing keys fall back to the defaults below, so a config file
//! written by an older release keeps working.

use crate::core::error::{AipacaError, Result};
use crate::core::fsutil;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

pub const CONFIG_FILE_NAME: &str = ".aipaca.yaml";
pub const CONFIG_ENV_VAR: &str = "AIPACA_CONFIG";
pub const CONFIG_VERSION: &str = "1";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub version: String,
    pub storage: StorageConfig,
    pub ai_patterns: Vec<String>,
    pub default_profile: String,
    pub profile_descriptions: BTreeMap<String, String>,
    /// Absolute path the config was loaded from or written to.
    #[serde(skip)]
    pub source: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Storage root; a leading `~` is expanded to the home directory.
    pub path: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        StorageConfig {
            path: "~/.aipaca".to_string(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            version: CONFIG_VERSION.to_string(),
            storage: StorageConfig::default(),
            ai_patterns: default_patterns(),
            default_profile: "default".to_string(),
            profile_descriptions: BTreeMap::new(),
            source: None,
        }
    }
}

pub fn default_patterns() -> Vec<String> {
    [
        ".claude",
        ".claude/**",
        ".cursor",
        ".cursor/**",
        "CLAUDE.md",
        "**/CLAUDE.md",
        "ai/",
        "ai/**",
        ".ai*",
    ]
    .iter()
    .map(|p| p.to_string())
    .collect()
}

impl Config {
    /// Config rooted at an explicit storage directory, default patterns.
    pub fn with_storage(root: &Path) -> Self {
        Config {
            storage: StorageConfig {
                path: root.to_string_lossy().to_string(),
            },
            ..Config::default()
        }
    }

    pub fn load(path: &Path) -> Result<Self> {
        let raw = match fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(AipacaError::NotFound(format!(
                    "config file at {}, run 'aipaca init' first",
                    path.display()
                )));
            }
            Err(e) => {
                return Err(AipacaError::io(
                    format!("failed to read config {}", path.display()),
                    e,
                ));
            }
        };

        let mut cfg = if raw.trim().is_empty() {
            Config::default()
        } else {
            serde_yaml::from_str(&raw).map_err(|e| {
                AipacaError::ConfigError(format!("failed to parse {}: {}", path.display(), e))
            })?
        };
        cfg.source = Some(fsutil::absolutize(path)?);
        Ok(cfg)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| {
                AipacaError::io(
                    format!("failed to create config directory {}", parent.display()),
                    e,
                )
            })?;
        }
        let body = serde_yaml::to_string(self)?;
        fs::write(path, body)
            .map_err(|e| AipacaError::io(format!("failed to write config {}", path.display()), e))
    }

    pub fn exists(path: &Path) -> bool {
        path.is_file()
    }

    pub fn storage_path(&self) -> PathBuf {
        expand_tilde(&self.storage.path)
    }

    pub fn profile_description(&self, name: &str) -> Option<&str> {
        self.profile_descriptions
            .get(name)
            .map(String::as_str)
            .filter(|d| !d.trim().is_empty())
    }
}

/// `~/.aipaca.yaml`, or a relative `.aipaca.yaml` when no home dir is known.
pub fn default_config_path() -> PathBuf {
    match dirs::home_dir() {
        Some(home) => home.join(CONFIG_FILE_NAME),
        None => PathBuf::from(CONFIG_FILE_NAME),
    }
}

/// Resolution order: `--config` flag, `AIPACA_CONFIG`, default path.
pub fn resolve_config_path(flag: Option<&Path>) -> PathBuf {
    if let Some(path) = flag {
        return path.to_path_buf();
    }
    match std::env::var_os(CONFIG_ENV_VAR) {
        Some(value) if !value.is_empty() => PathBuf::from(value),
        _ => default_config_path(),
    }
}

/// Expand a leading `~` or `~/`. `~user` forms are left untouched.
pub fn expand_tilde(raw: &str) -> PathBuf {
    let rest = if raw == "~" {
        Some("")
    } else {
        raw.strip_prefix("~/")
    };

    match (rest, dirs::home_dir()) {
        (Some(""), Some(home)) => home,
        (Some(rest), Some(home)) => home.join(rest),
        _ => PathBuf::from(raw),
    }
}
