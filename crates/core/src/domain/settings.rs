use std::collections::BTreeSet;
use std::path::PathBuf;

use crate::error::{CoreError, Result};

/// Per-repository cleanup rules
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CleanupOptions {
    /// Branch names that are never deleted
    pub protected_branches: BTreeSet<String>,
    /// Report what would be deleted without deleting
    pub dry_run: bool,
    /// Also treat squash-merged branches as deletable
    pub squashed: bool,
}

impl CleanupOptions {
    pub fn is_protected(&self, branch: &str) -> bool {
        self.protected_branches.contains(branch)
    }
}

/// Everything a run needs, resolved from CLI and config file
#[derive(Debug, Clone, PartialEq)]
pub struct CleanupConfig {
    pub root: PathBuf,
    pub concurrency: usize,
    pub options: CleanupOptions,
}

impl CleanupConfig {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            concurrency: 1,
            options: CleanupOptions::default(),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.concurrency == 0 {
            return Err(CoreError::InvalidConcurrency {
                value: self.concurrency,
            });
        }
        Ok(())
    }
}
