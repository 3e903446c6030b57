use clap::Parser;
use lopper::cli::CliArgs;
use std::process::ExitCode;

fn main() -> ExitCode {
    let cli = CliArgs::parse();

    // Not #[tokio::main]: its runtime would join git calls left running after a quit
    let result = lopper::app::init_tracing(&cli)
        .and_then(|()| lopper::app::block_on(lopper::app::run(cli)))
        .and_then(|result| result);

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("Application error: {:#}", e);
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}
