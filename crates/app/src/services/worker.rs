use lopper_core::app::{cleanup_repository, CleanupOutcome};
use lopper_core::domain::{CleanupOptions, Event, Repository};
use lopper_core::ports::RepositoryClient;
use lopper_core::CleanupError;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{error, info, warn};

use super::limiter::Permit;

/// Runs the cleanup procedure for one dispatched repository
pub struct Worker {
    pub index: usize,
    pub repo: Repository,
    pub client: Arc<dyn RepositoryClient>,
    pub options: Arc<CleanupOptions>,
    pub event_tx: mpsc::UnboundedSender<Event>,
}

impl Worker {
    /// Clean up the repository, report completion, then free the permit.
    ///
    /// The permit is released only after `Completed` is queued, so the next
    /// `Started` can never overtake it.
    pub async fn run(self, permit: Permit) {
        let Worker {
            index,
            repo,
            client,
            options,
            event_tx,
        } = self;

        let name = repo.name.clone();
        // Git calls block for their full duration
        let result = tokio::task::spawn_blocking(move || {
            cleanup_repository(client.as_ref(), &repo, &options)
        })
        .await;

        let CleanupOutcome {
            main_branch,
            deleted_branches,
            errors,
        } = match result {
            Ok(outcome) => outcome,
            Err(e) => {
                error!("Cleanup task for {} failed: {}", name, e);
                CleanupOutcome {
                    errors: vec![CleanupError::WorkerPanicked {
                        reason: e.to_string(),
                    }],
                    ..CleanupOutcome::default()
                }
            }
        };

        let main_branch = main_branch.as_deref().unwrap_or("<none>");
        if errors.is_empty() {
            info!(
                "Repository {} cleaned against {}: {} branches",
                name,
                main_branch,
                deleted_branches.len()
            );
        } else {
            warn!(
                "Repository {} finished against {} with {} errors",
                name,
                main_branch,
                errors.len()
            );
        }

        if event_tx
            .send(Event::Completed {
                index,
                branches: deleted_branches,
                errors,
            })
            .is_err()
        {
            warn!("Event receiver dropped before {} completed", name);
        }
        permit.release();
    }
}
