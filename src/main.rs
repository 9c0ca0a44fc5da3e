//! Net Thud data generators.
//!
//! Each subcommand fetches one source and writes one JSON file for the site.

use std::path::PathBuf;
use std::process::ExitCode;

use chrono::Utc;
use clap::{Parser, Subcommand};
use log::error;

use netthud::config::Config;
use netthud::runner::{self, FeedKind};

#[derive(Parser)]
#[command(name = "netthud")]
#[command(about = "Generate the Net Thud site data files", long_about = None)]
struct Cli {
    /// Output directory (overrides OUTPUT_DIR)
    #[arg(short, long)]
    out: Option<PathBuf>,

    /// Write placeholder content without touching the network
    #[arg(long)]
    demo: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Clone, Copy)]
enum Commands {
    /// Recent results and live matches
    Scores,
    /// League standings tables
    Leagues,
    /// Upcoming fixtures with home/draw/away odds
    Upcoming,
    /// Football headlines from RSS
    News,
    /// Transfer stories from RSS
    Transfers,
    /// Pre-match signals
    Signals,
    /// Every generator in turn
    All,
}

impl Commands {
    fn feeds(self) -> Vec<FeedKind> {
        match self {
            Commands::Scores => vec![FeedKind::Scores],
            Commands::Leagues => vec![FeedKind::Leagues],
            Commands::Upcoming => vec![FeedKind::Upcoming],
            Commands::News => vec![FeedKind::News],
            Commands::Transfers => vec![FeedKind::Transfers],
            Commands::Signals => vec![FeedKind::Signals],
            Commands::All => FeedKind::ALL.to_vec(),
        }
    }
}

fn main() -> ExitCode {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");

    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level))
        .format_timestamp_secs()
        .init();

    let mut cfg = Config::from_env();
    if let Some(out) = cli.out {
        cfg.output_dir = out;
    }

    let now = Utc::now();
    let mut failed = 0usize;
    for kind in cli.command.feeds() {
        match runner::run_feed(kind, &cfg, cli.demo, now) {
            Ok(outcome) => println!("{kind}: {outcome}"),
            Err(err) => {
                error!("{kind}: {err:#}");
                failed += 1;
            }
        }
    }

    if failed > 0 {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}
