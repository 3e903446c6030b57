use std::path::PathBuf;
use thiserror::Error;

use crate::domain::ProcessingState;

/// Errors that end a whole run
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("failed to read {}: {source}", path.display())]
    Discovery {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to acquire a concurrency permit: {reason}")]
    PermitAcquisition { reason: String },

    #[error("concurrency must be at least 1 (got {value})")]
    InvalidConcurrency { value: usize },

    #[error("Repository list was already loaded")]
    AlreadyLoaded,

    #[error("Repository not found at position {index}")]
    RepositoryNotFound { index: usize },

    #[error("Repository at position {index} cannot move from {from:?} to {to:?}")]
    InvalidTransition {
        index: usize,
        from: ProcessingState,
        to: ProcessingState,
    },
}

/// Errors scoped to a single repository or branch; recorded, never fatal
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CleanupError {
    #[error("the main branch has not been checked out locally")]
    MainBranchUnresolved,

    #[error(transparent)]
    Sync(#[from] PullError),

    #[error("failed to get merged branches: {reason}")]
    BranchListing { reason: String },

    #[error("failed to get squash-merged branches: {reason}")]
    SquashListing { reason: String },

    #[error("failed to delete branch {branch}: {reason}")]
    BranchDeletion { branch: String, reason: String },

    #[error("cleanup task failed: {reason}")]
    WorkerPanicked { reason: String },
}

/// Outcome of a failed `pull`
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PullError {
    #[error("remote repository not found")]
    RemoteNotFound,

    #[error("there is a conflict between remote and local changes")]
    Conflict,

    #[error("failed to pull latest changes: {0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, CoreError>;
