use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug, PartialEq)]
#[command(name = "lopper")]
#[command(about = "Delete merged branches across every Git repository under a directory")]
pub struct CliArgs {
    /// Directory to scan, or a repository itself
    #[arg(short, long)]
    pub path: PathBuf,

    /// Branch that must never be deleted (repeatable)
    #[arg(short = 'b', long = "protected-branch")]
    pub protected_branches: Vec<String>,

    /// Number of repositories processed at once [default: 1]
    #[arg(short, long)]
    pub concurrency: Option<usize>,

    /// Report what would be deleted without deleting anything
    #[arg(long)]
    pub dry_run: bool,

    /// Also delete branches that were squash-merged into main
    #[arg(long)]
    pub squashed: bool,

    /// Print a text report instead of the interactive view
    #[arg(long)]
    pub plain: bool,

    /// Write logs to this file
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    /// Path to configuration file
    #[arg(long)]
    pub config: Option<PathBuf>,
}
