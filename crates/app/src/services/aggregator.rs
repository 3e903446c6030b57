use lopper_core::app::{Command, ProgressProjection};
use lopper_core::domain::{CleanupConfig, Event, Repository};
use lopper_core::ports::{DiscoverReq, DiscoveryPort, RepositoryClient};
use lopper_core::{CoreError, Result};
use std::sync::Arc;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinSet;
use tracing::{debug, error, info, warn};

use super::dispatcher::Dispatcher;
use super::limiter::ConcurrencyLimiter;

/// How a run ended when it did not hit a fatal error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// Every discovered repository reached a terminal state
    Finished,
    /// The user quit before the run finished
    Cancelled,
}

/// The single owner of run progress.
///
/// Discovery, the dispatcher and the workers only ever talk to it through the
/// event channel; it applies one event at a time to the state held in the
/// snapshot channel, so receivers see every applied event.
pub struct StateAggregator {
    // Ports (dependency injection)
    discovery_port: Arc<dyn DiscoveryPort>,
    client: Arc<dyn RepositoryClient>,

    config: CleanupConfig,
    limiter: ConcurrencyLimiter,

    // Event bus
    event_tx: mpsc::UnboundedSender<Event>,
    event_rx: mpsc::UnboundedReceiver<Event>,

    // Command receiver
    command_rx: mpsc::UnboundedReceiver<Command>,

    // Progress state, updated in place and shared with receivers
    snapshot_tx: watch::Sender<ProgressProjection>,

    // Background task management
    tasks: JoinSet<()>,
}

impl StateAggregator {
    pub fn new(
        discovery_port: Arc<dyn DiscoveryPort>,
        client: Arc<dyn RepositoryClient>,
        config: CleanupConfig,
    ) -> Result<(
        Self,
        watch::Receiver<ProgressProjection>,
        mpsc::UnboundedSender<Command>,
    )> {
        config.validate()?;
        let limiter = ConcurrencyLimiter::new(config.concurrency)?;

        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let (snapshot_tx, snapshot_rx) = watch::channel(ProgressProjection::default());

        let aggregator = Self {
            discovery_port,
            client,
            config,
            limiter,
            event_tx,
            event_rx,
            command_rx,
            snapshot_tx,
            tasks: JoinSet::new(),
        };

        Ok((aggregator, snapshot_rx, command_tx))
    }

    #[cfg(test)]
    fn event_sender(&self) -> mpsc::UnboundedSender<Event> {
        self.event_tx.clone()
    }

    /// Discover, clean up every repository, and return when the run ends.
    ///
    /// Fatal errors (discovery or permit acquisition) are returned as `Err`.
    pub async fn run(mut self) -> Result<RunOutcome> {
        info!(
            "Starting run on {} (concurrency {}, dry run {}, squashed {})",
            self.config.root.display(),
            self.config.concurrency,
            self.config.options.dry_run,
            self.config.options.squashed
        );
        self.start_discovery();
        let outcome = self.run_event_loop().await;
        self.shutdown();
        outcome
    }

    /// Start discovery in background
    fn start_discovery(&mut self) {
        let discovery_port = self.discovery_port.clone();
        let event_tx = self.event_tx.clone();
        let base = self.config.root.clone();

        self.tasks.spawn(async move {
            info!("Discovery task starting for {}", base.display());

            let result = tokio::task::spawn_blocking(move || {
                discovery_port.scan(DiscoverReq { base })
            })
            .await;

            let event = match result {
                Ok(Ok(repos)) => {
                    info!("Discovery found {} repositories", repos.len());
                    Event::Discovered { repos }
                }
                Ok(Err(error)) => {
                    error!("Discovery failed: {}", error);
                    Event::Fatal { error }
                }
                Err(e) => {
                    error!("Discovery task panicked: {}", e);
                    Event::Fatal {
                        error: CoreError::Discovery {
                            path: std::path::PathBuf::new(),
                            source: std::io::Error::other(e.to_string()),
                        },
                    }
                }
            };
            let _ = event_tx.send(event);
        });
    }

    /// Start the dispatcher for the freshly loaded repository list
    fn start_dispatch(&mut self, repos: Vec<Repository>) {
        let dispatcher = Dispatcher::new(
            self.limiter.clone(),
            self.client.clone(),
            Arc::new(self.config.options.clone()),
            self.event_tx.clone(),
        );
        self.tasks.spawn(dispatcher.run(repos));
    }

    /// Main event processing loop
    async fn run_event_loop(&mut self) -> Result<RunOutcome> {
        info!("Starting event loop");
        let mut commands_open = true;

        loop {
            tokio::select! {
                biased;

                // Handle commands from the presentation layer
                command = self.command_rx.recv(), if commands_open => {
                    match command {
                        Some(Command::Quit) => {
                            info!("Quit requested, cancelling run");
                            return Ok(RunOutcome::Cancelled);
                        }
                        None => {
                            debug!("Command channel closed");
                            commands_open = false;
                        }
                    }
                }

                // Handle events from the event bus
                event = self.event_rx.recv() => {
                    match event {
                        Some(event) => {
                            if let Some(outcome) = self.handle_event(event)? {
                                return Ok(outcome);
                            }
                        }
                        None => {
                            // unreachable while we hold a sender, kept for completeness
                            info!("Event channel closed, stopping event loop");
                            return Ok(RunOutcome::Cancelled);
                        }
                    }
                }

                // Handle completed background tasks
                Some(task_result) = self.tasks.join_next(), if !self.tasks.is_empty() => {
                    if let Err(e) = task_result {
                        error!("Background task panicked: {}", e);
                    }
                }
            }
        }
    }

    /// Apply a single event, publish the new state, and say whether the run ended
    fn handle_event(&mut self, event: Event) -> Result<Option<RunOutcome>> {
        match &event {
            Event::Discovered { repos } => info!("Loaded {} repositories", repos.len()),
            Event::Started { index, repo } => info!("Processing {} (#{})", repo.name, index),
            Event::Completed { index, branches, errors } => info!(
                "Completed #{}: {} branches, {} errors",
                index,
                branches.len(),
                errors.len()
            ),
            Event::Fatal { error } => error!("Fatal error: {}", error),
        }

        let applied = self.snapshot_tx.send_if_modified(|projection| {
            match projection.apply(&event) {
                Ok(()) => true,
                Err(e) => {
                    warn!("Ignoring event: {}", e);
                    false
                }
            }
        });
        if !applied {
            return Ok(None);
        }

        match event {
            Event::Fatal { error } => Err(error),
            Event::Discovered { repos } if repos.is_empty() => {
                info!("No repositories found");
                Ok(Some(RunOutcome::Finished))
            }
            Event::Discovered { repos } => {
                self.start_dispatch(repos);
                Ok(None)
            }
            Event::Completed { .. } => {
                let projection = self.snapshot_tx.borrow();
                if !projection.is_finished() {
                    return Ok(None);
                }
                info!(
                    "All {} repositories processed, {} branches deleted",
                    projection.total(),
                    projection.total_deleted_branches()
                );
                Ok(Some(RunOutcome::Finished))
            }
            Event::Started { .. } => Ok(None),
        }
    }

    /// Stop admitting work and drop background tasks.
    ///
    /// Git calls already running on the blocking pool are not joined here;
    /// `app::block_on` stops waiting for them once the run returns.
    fn shutdown(&mut self) {
        self.limiter.close();
        self.tasks.abort_all();
    }
}
