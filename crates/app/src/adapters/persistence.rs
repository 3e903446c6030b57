use anyhow::{Context, Result};
use directories::ProjectDirs;
use lopper_core::ports::{AppConfig, ConfigStore};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// File-based configuration store that implements ConfigStore.
///
/// A missing file is not an error and is never created; defaults apply.
pub struct FileConfigStore {
    config_path: PathBuf,
}

impl FileConfigStore {
    pub fn new() -> Result<Self> {
        let config_path = Self::get_default_config_path()?;
        Ok(Self { config_path })
    }

    pub fn with_path<P: AsRef<Path>>(config_path: P) -> Self {
        Self {
            config_path: config_path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.config_path
    }

    fn get_default_config_path() -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("", "", "lopper")
            .context("Failed to determine project directories")?;

        let config_dir = proj_dirs.config_dir();
        Ok(config_dir.join("lopper.toml"))
    }
}

impl ConfigStore for FileConfigStore {
    fn load(&self) -> Result<AppConfig> {
        if !self.config_path.exists() {
            debug!("No config file at {}, using defaults", self.config_path.display());
            return Ok(AppConfig::default());
        }

        let contents = fs::read_to_string(&self.config_path)
            .with_context(|| format!("Failed to read config file: {}", self.config_path.display()))?;

        let config: AppConfig = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", self.config_path.display()))?;

        Ok(config)
    }
}
