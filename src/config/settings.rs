use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Binary names tried, in order, when no virtualenv is given.
pub const DEFAULT_PIP_BINARIES: &[&str] = &["pip", "pip3"];

/// Settings for the real collaborators behind `pipctl`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Directories searched, in order, for `salt://` references.
    pub file_roots: Vec<PathBuf>,
    /// Where resolved requirements files are stored. Defaults to the
    /// platform cache directory.
    pub cache_dir: Option<PathBuf>,
    pub pip_binaries: Vec<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            file_roots: vec![PathBuf::from("/srv/salt")],
            cache_dir: None,
            pip_binaries: DEFAULT_PIP_BINARIES.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl Settings {
    /// Load settings from `path`, or from the default location when `None`.
    ///
    /// A missing file yields the defaults; a malformed one is an error.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(p) => p.to_path_buf(),
            None => match Self::default_config_path() {
                Some(p) => p,
                None => return Ok(Self::default()),
            },
        };

        if !path.exists() {
            tracing::debug!(path = %path.display(), "No config file, using defaults");
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let settings: Settings = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        tracing::debug!(path = %path.display(), "Loaded config file");
        Ok(settings)
    }

    pub fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("org", "pipctl", "pipctl")
            .map(|dirs| dirs.config_dir().join("config.json"))
    }

    pub fn resolved_cache_dir(&self) -> Result<PathBuf> {
        if let Some(dir) = &self.cache_dir {
            return Ok(dir.clone());
        }
        let dirs = directories::ProjectDirs::from("org", "pipctl", "pipctl")
            .ok_or_else(|| anyhow::anyhow!("Failed to determine cache directory"))?;
        Ok(dirs.cache_dir().to_path_buf())
    }
}
