use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::CleanupError;

/// A discovered Git repository, identified by `(root_path, name)`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Repository {
    /// Directory that contains the repository
    pub root_path: PathBuf,
    /// Directory name of the repository itself
    pub name: String,
}

impl Repository {
    pub fn new(root_path: impl Into<PathBuf>, name: impl Into<String>) -> Self {
        Self {
            root_path: root_path.into(),
            name: name.into(),
        }
    }

    /// Working directory of the repository
    pub fn full_path(&self) -> PathBuf {
        self.root_path.join(&self.name)
    }
}

impl std::fmt::Display for Repository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.name, self.full_path().display())
    }
}

/// Where a repository is in its lifecycle.
///
/// Only `Pending -> InProgress -> {Completed | Failed}` is allowed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ProcessingState {
    #[default]
    Pending,
    InProgress,
    Completed,
    Failed,
}

impl ProcessingState {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }

    pub fn can_transition_to(self, next: ProcessingState) -> bool {
        matches!(
            (self, next),
            (Self::Pending, Self::InProgress)
                | (Self::InProgress, Self::Completed)
                | (Self::InProgress, Self::Failed)
        )
    }
}

/// Progress of one repository as seen by the presentation layer
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ProgressRecord {
    pub state: ProcessingState,
    pub deleted_branches: Vec<String>,
    pub errors: Vec<CleanupError>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_path_joins_root_and_name() {
        let repo = Repository::new("/work", "proj");
        assert_eq!(repo.full_path(), PathBuf::from("/work/proj"));
    }

    #[test]
    fn test_repository_display() {
        let repo = Repository::new("/work", "proj");
        let display = repo.to_string();
        assert!(display.starts_with("proj"));
        assert!(display.contains("/work/proj"));
    }

    #[test]
    fn test_state_transitions_only_move_forward() {
        use ProcessingState::*;

        assert!(Pending.can_transition_to(InProgress));
        assert!(InProgress.can_transition_to(Completed));
        assert!(InProgress.can_transition_to(Failed));

        assert!(!Pending.can_transition_to(Completed));
        assert!(!InProgress.can_transition_to(Pending));
        assert!(!Completed.can_transition_to(Failed));
        assert!(!Failed.can_transition_to(InProgress));
        assert!(!Completed.can_transition_to(Completed));
    }

    #[test]
    fn test_terminal_states() {
        assert!(!ProcessingState::Pending.is_terminal());
        assert!(!ProcessingState::InProgress.is_terminal());
        assert!(ProcessingState::Completed.is_terminal());
        assert!(ProcessingState::Failed.is_terminal());
    }
}
