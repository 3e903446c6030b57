use crate::error::PullError;
use anyhow::Result;
use std::path::Path;

/// Port for the Git operations the cleanup procedure needs.
///
/// Every call is blocking and operates on one repository working directory.
/// Callers on an async runtime should run these in `spawn_blocking`.
pub trait RepositoryClient: Send + Sync {
    /// Whether `path` is itself a Git repository
    fn is_repository(&self, path: &Path) -> bool;

    /// Check out a local branch
    fn checkout(&self, path: &Path, branch: &str) -> Result<()>;

    /// Bring the checked out branch up to date with its remote
    fn pull(&self, path: &Path) -> std::result::Result<(), PullError>;

    /// Local branches whose tip is reachable from `main_branch`, sorted by name
    fn list_merged_branches(&self, path: &Path, main_branch: &str) -> Result<Vec<String>>;

    /// Local branches whose changes already landed on `main_branch` as a squashed commit.
    ///
    /// Best-effort: a branch is reported when a patch-equivalent commit exists on the
    /// main branch after the merge base. Names in `already_merged` are skipped, so the
    /// result never overlaps with `list_merged_branches`.
    fn list_squash_merged_branches(
        &self,
        path: &Path,
        main_branch: &str,
        already_merged: &[String],
    ) -> Result<Vec<String>>;

    /// Delete a local branch
    fn delete_branch(&self, path: &Path, branch: &str) -> Result<()>;
}
