use anyhow::{Context, Result};
use lopper_core::domain::{CleanupConfig, CleanupOptions};
use lopper_core::ports::ConfigStore;
use tracing::debug;

use crate::adapters::persistence::FileConfigStore;
use crate::cli::CliArgs;

/// Pick the config store: the `--config` path if given, the per-user default otherwise
pub fn config_store(cli: &CliArgs) -> Result<FileConfigStore> {
    match &cli.config {
        Some(path) => Ok(FileConfigStore::with_path(path)),
        None => FileConfigStore::new(),
    }
}

/// Merge the config file with CLI flags into a validated run configuration.
///
/// CLI values override the file; protected branches from both are kept.
pub fn resolve(cli: &CliArgs, store: &dyn ConfigStore) -> Result<CleanupConfig> {
    let file = store.load()?;
    debug!("Loaded config file: {:?}", file);

    let protected_branches = file
        .protected_branches
        .into_iter()
        .chain(cli.protected_branches.iter().cloned())
        .collect();

    let config = CleanupConfig {
        root: cli.path.clone(),
        concurrency: cli.concurrency.unwrap_or(file.concurrency),
        options: CleanupOptions {
            protected_branches,
            dry_run: cli.dry_run,
            squashed: cli.squashed || file.squashed,
        },
    };

    config.validate().context("Invalid configuration")?;
    Ok(config)
}
