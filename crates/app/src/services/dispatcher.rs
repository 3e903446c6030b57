use lopper_core::domain::{CleanupOptions, Event, Repository};
use lopper_core::ports::RepositoryClient;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, error, info};

use super::limiter::ConcurrencyLimiter;
use super::worker::Worker;

/// Admits repositories in discovery order, one limiter permit each
pub struct Dispatcher {
    limiter: ConcurrencyLimiter,
    client: Arc<dyn RepositoryClient>,
    options: Arc<CleanupOptions>,
    event_tx: mpsc::UnboundedSender<Event>,
}

impl Dispatcher {
    pub fn new(
        limiter: ConcurrencyLimiter,
        client: Arc<dyn RepositoryClient>,
        options: Arc<CleanupOptions>,
        event_tx: mpsc::UnboundedSender<Event>,
    ) -> Self {
        Self {
            limiter,
            client,
            options,
            event_tx,
        }
    }

    /// Dispatch every repository, then return without waiting for completions.
    ///
    /// A failed permit acquisition is reported as `Fatal` and stops dispatching.
    pub async fn run(self, repos: Vec<Repository>) {
        let total = repos.len();
        info!(
            "Dispatching {} repositories over {} permits",
            total,
            self.limiter.capacity()
        );
        for (index, repo) in repos.into_iter().enumerate() {
            let permit = match self.limiter.acquire().await {
                Ok(permit) => permit,
                Err(error) => {
                    error!("Dispatch stopped at {}/{}: {}", index, total, error);
                    let _ = self.event_tx.send(Event::Fatal { error });
                    return;
                }
            };

            debug!(
                "Dispatching {} ({}/{}), {} permits left",
                repo.name,
                index + 1,
                total,
                self.limiter.available()
            );
            if self
                .event_tx
                .send(Event::Started {
                    index,
                    repo: repo.clone(),
                })
                .is_err()
            {
                error!("Event receiver dropped during dispatch");
                return;
            }

            let worker = Worker {
                index,
                repo,
                client: self.client.clone(),
                options: self.options.clone(),
                event_tx: self.event_tx.clone(),
            };
            tokio::spawn(worker.run(permit));
        }
        info!("Dispatched all {} repositories", total);
    }
}
