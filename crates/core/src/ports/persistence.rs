use anyhow::Result;

/// Configuration store interface
pub trait ConfigStore: Send + Sync {
    /// Load configuration from storage, falling back to defaults when absent
    fn load(&self) -> Result<AppConfig>;
}

/// Defaults read from the configuration file. CLI flags win over these.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub protected_branches: Vec<String>,
    pub concurrency: usize,
    pub squashed: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            protected_branches: Vec::new(),
            concurrency: 1,
            squashed: false,
        }
    }
}
