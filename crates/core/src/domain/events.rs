use super::repo::Repository;
use crate::error::{CleanupError, CoreError};

/// Events consumed by the state aggregator, one at a time
#[derive(Debug)]
pub enum Event {
    /// Discovery finished; the list is final for the whole run
    Discovered { repos: Vec<Repository> },

    /// A permit was granted and the repository is being cleaned up
    Started { index: usize, repo: Repository },

    /// The cleanup procedure finished for the repository at `index`
    Completed {
        index: usize,
        branches: Vec<String>,
        errors: Vec<CleanupError>,
    },

    /// Something went wrong that ends the whole run
    Fatal { error: CoreError },
}
