// Composition root: wires adapters into the aggregator and drives the chosen front end

use anyhow::{Context, Result};
use crossterm::{
    event::{self, Event as TermEvent, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use lopper_core::app::{Command, ProgressProjection};
use lopper_core::ports::{DiscoveryPort, RepositoryClient};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::fs::File;
use std::future::Future;
use std::io;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tokio::sync::{mpsc, watch};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use crate::adapters::{discovery::FsDiscoveryAdapter, git::GitAdapter};
use crate::cli::CliArgs;
use crate::config;
use crate::services::{RunOutcome, StateAggregator};
use crate::tui::{TuiMessage, TuiModel, TuiUpdate, TuiView};

const POLL_INTERVAL: Duration = Duration::from_millis(16);
const SPINNER_INTERVAL: Duration = Duration::from_millis(80);

/// How long exiting waits for git calls still running on the blocking pool
pub const SHUTDOWN_GRACE: Duration = Duration::from_millis(250);

/// Exit status after a second interrupt, as if killed by SIGINT
const INTERRUPTED_EXIT_CODE: i32 = 130;

type Term = Terminal<CrosstermBackend<io::Stdout>>;

/// Route logs to `--log-file` if given, to stderr in plain mode, nowhere otherwise.
///
/// The TUI owns the terminal, so it never shares it with log output.
pub fn init_tracing(cli: &CliArgs) -> Result<()> {
    if let Some(path) = &cli.log_file {
        let file = File::create(path)
            .with_context(|| format!("Failed to create log file: {}", path.display()))?;
        tracing_subscriber::fmt()
            .with_env_filter(env_filter("info"))
            .with_writer(Mutex::new(file))
            .with_ansi(false)
            .init();
    } else if cli.plain {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter("warn"))
            .with_writer(io::stderr)
            .init();
    }
    Ok(())
}

fn env_filter(default: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default))
}

/// Drive `future` to completion on a fresh runtime, then tear it down.
///
/// A cancelled run can leave a git call on the blocking pool with no timeout.
/// The runtime waits at most `SHUTDOWN_GRACE` for it, so quitting ends the
/// process instead of joining it.
pub fn block_on<F: Future>(future: F) -> Result<F::Output> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("Failed to start async runtime")?;
    let output = runtime.block_on(future);
    runtime.shutdown_timeout(SHUTDOWN_GRACE);
    Ok(output)
}

/// Resolve configuration, run the engine, and present its progress
pub async fn run(cli: CliArgs) -> Result<()> {
    let store = config::config_store(&cli)?;
    let config = config::resolve(&cli, &store)?;
    let dry_run = config.options.dry_run;
    info!("Resolved configuration: {:?}", config);

    // Create adapters (dependency injection)
    let client: Arc<dyn RepositoryClient> = Arc::new(GitAdapter::new());
    let discovery: Arc<dyn DiscoveryPort> = Arc::new(FsDiscoveryAdapter::new(client.clone()));

    let (aggregator, snapshot_rx, command_tx) = StateAggregator::new(discovery, client, config)?;

    if cli.plain {
        run_plain(aggregator, snapshot_rx, command_tx, dry_run).await
    } else {
        run_tui(aggregator, snapshot_rx, command_tx, dry_run).await
    }
}

/// Headless run: wait for the engine, then print the report
async fn run_plain(
    aggregator: StateAggregator,
    snapshot_rx: watch::Receiver<ProgressProjection>,
    command_tx: mpsc::UnboundedSender<Command>,
    dry_run: bool,
) -> Result<()> {
    let handle = tokio::spawn(aggregator.run());

    // Listening for Ctrl+C replaces the default handler, so the second one exits here
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Interrupted, cancelling run");
            let _ = command_tx.send(Command::Quit);
        }
        if tokio::signal::ctrl_c().await.is_ok() {
            error!("Interrupted again, exiting");
            std::process::exit(INTERRUPTED_EXIT_CODE);
        }
    });

    let outcome = handle.await.context("Cleanup engine task failed")??;
    info!("Run ended: {:?}", outcome);

    let mut model = TuiModel::new(dry_run);
    model.set_projection(snapshot_rx.borrow().clone());
    println!("{}", TuiView::report(&model));
    if outcome == RunOutcome::Cancelled {
        println!("(cancelled)");
    }
    Ok(())
}

/// Interactive run: the view stays up after the engine finishes, until the user quits
async fn run_tui(
    aggregator: StateAggregator,
    mut snapshot_rx: watch::Receiver<ProgressProjection>,
    command_tx: mpsc::UnboundedSender<Command>,
    dry_run: bool,
) -> Result<()> {
    let mut terminal = setup_terminal()?;
    let handle = tokio::spawn(aggregator.run());

    let mut model = TuiModel::new(dry_run);
    let result = run_main_loop(&mut model, &mut terminal, &mut snapshot_rx, &command_tx).await;

    restore_terminal(&mut terminal)?;

    // Quit was sent, or the engine already ended on its own
    let outcome = handle.await.context("Cleanup engine task failed")?;
    result?;
    let outcome = outcome?;
    info!("Run ended: {:?}", outcome);
    Ok(())
}

/// Main loop: fold in new snapshots, handle input, redraw
async fn run_main_loop(
    model: &mut TuiModel,
    terminal: &mut Term,
    snapshot_rx: &mut watch::Receiver<ProgressProjection>,
    command_tx: &mpsc::UnboundedSender<Command>,
) -> Result<()> {
    let size = terminal.size()?;
    TuiUpdate::handle_resize(model, size.width, size.height);

    let mut engine_running = true;
    let mut last_tick = Instant::now();

    loop {
        if engine_running {
            match snapshot_rx.has_changed() {
                Ok(true) => model.set_projection(snapshot_rx.borrow_and_update().clone()),
                Ok(false) => {}
                Err(_) => {
                    // sender gone: take the final state once
                    model.set_projection(snapshot_rx.borrow().clone());
                    engine_running = false;
                }
            }
        }

        if model.projection.fatal.is_some() {
            error!("Run aborted: {:?}", model.projection.fatal);
            break;
        }

        if last_tick.elapsed() >= SPINNER_INTERVAL {
            TuiUpdate::handle_tick(model);
            last_tick = Instant::now();
        }

        terminal.draw(|frame| TuiView::render(model, frame))?;

        if event::poll(POLL_INTERVAL)? {
            match event::read()? {
                TermEvent::Key(key) if key.kind == KeyEventKind::Press => {
                    if let TuiMessage::Command(command) =
                        TuiUpdate::handle_key(model, key.code, key.modifiers)
                    {
                        info!("Sending command to engine: {:?}", command);
                        // fails only once the engine has ended, which is fine
                        let _ = command_tx.send(command);
                    }
                }
                TermEvent::Resize(width, height) => {
                    TuiUpdate::handle_resize(model, width, height);
                }
                _ => {}
            }
        }

        if model.should_quit {
            info!("Quit requested, exiting main loop");
            break;
        }

        tokio::task::yield_now().await;
    }

    Ok(())
}

fn setup_terminal() -> Result<Term> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    Ok(Terminal::new(backend)?)
}

fn restore_terminal(terminal: &mut Term) -> Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}
