use std::collections::HashSet;
use std::path::Path;

use crate::domain::{CleanupOptions, Repository};
use crate::error::CleanupError;
use crate::ports::RepositoryClient;

/// Branch names tried, in order, when resolving the main branch
pub const MAIN_BRANCH_CANDIDATES: [&str; 2] = ["main", "master"];

/// Result of cleaning up one repository
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CleanupOutcome {
    /// The branch merge status was evaluated against, if it could be checked out
    pub main_branch: Option<String>,
    /// Branches deleted (or that would be deleted in a dry run), in processing order
    pub deleted_branches: Vec<String>,
    /// Everything that went wrong; empty iff the repository succeeded
    pub errors: Vec<CleanupError>,
}

impl CleanupOutcome {
    fn failed(main_branch: Option<String>, error: CleanupError) -> Self {
        Self {
            main_branch,
            deleted_branches: Vec::new(),
            errors: vec![error],
        }
    }
}

/// Remove dead branches from one repository.
///
/// Per-branch failures are collected and do not stop the remaining branches.
/// Failing to resolve the main branch, to pull, or to list merged branches
/// ends the procedure before any branch is touched.
pub fn cleanup_repository(
    client: &dyn RepositoryClient,
    repo: &Repository,
    options: &CleanupOptions,
) -> CleanupOutcome {
    let path = repo.full_path();

    let Some(main_branch) = resolve_main_branch(client, &path) else {
        return CleanupOutcome::failed(None, CleanupError::MainBranchUnresolved);
    };

    // make sure the merged set is computed against the latest main
    if let Err(err) = client.pull(&path) {
        return CleanupOutcome::failed(Some(main_branch), err.into());
    }

    let merged = match client.list_merged_branches(&path, &main_branch) {
        Ok(branches) => branches,
        Err(err) => {
            return CleanupOutcome::failed(
                Some(main_branch),
                CleanupError::BranchListing {
                    reason: format!("{err:#}"),
                },
            )
        }
    };

    let mut outcome = CleanupOutcome {
        main_branch: Some(main_branch.clone()),
        ..CleanupOutcome::default()
    };

    let mut seen: HashSet<String> = HashSet::new();
    let mut candidates: Vec<String> = merged
        .iter()
        .filter(|b| seen.insert((*b).clone()))
        .cloned()
        .collect();

    if options.squashed {
        match client.list_squash_merged_branches(&path, &main_branch, &merged) {
            Ok(squashed) => {
                candidates.extend(squashed.into_iter().filter(|b| seen.insert(b.clone())));
            }
            Err(err) => outcome.errors.push(CleanupError::SquashListing {
                reason: format!("{err:#}"),
            }),
        }
    }

    for branch in candidates {
        if branch == main_branch || options.is_protected(&branch) {
            continue;
        }
        if options.dry_run {
            outcome.deleted_branches.push(branch);
            continue;
        }
        match client.delete_branch(&path, &branch) {
            Ok(()) => outcome.deleted_branches.push(branch),
            Err(err) => outcome.errors.push(CleanupError::BranchDeletion {
                branch,
                reason: format!("{err:#}"),
            }),
        }
    }

    outcome
}

fn resolve_main_branch(client: &dyn RepositoryClient, path: &Path) -> Option<String> {
    MAIN_BRANCH_CANDIDATES
        .iter()
        .find(|candidate| client.checkout(path, candidate).is_ok())
        .map(|candidate| candidate.to_string())
}
