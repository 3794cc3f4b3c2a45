//! Waymark CLI
//!
//! Replay scroll scenarios against the checkpoint tracker and inspect the
//! thresholds they resolve to.

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod replay;
mod scenario;

use scenario::Scenario;

#[derive(Parser)]
#[command(name = "waymark")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Viewport checkpoint tracker", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Replay a scenario and print every crossing
    Replay {
        /// Scenario file (TOML)
        scenario: PathBuf,
    },

    /// Print the threshold each checkpoint in a scenario resolves to
    Check {
        /// Scenario file (TOML)
        scenario: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    match cli.command {
        Commands::Replay { scenario } => cmd_replay(&scenario),
        Commands::Check { scenario } => cmd_check(&scenario),
    }
}

fn cmd_replay(path: &Path) -> Result<()> {
    let scenario = Scenario::load(path)?;
    info!("Replaying {}", path.display());

    let report = replay::replay(&scenario)?;
    for record in &report.records {
        println!("{}", record);
    }
    println!(
        "{} crossing(s), {} checkpoint(s) remaining{}",
        report.records.len(),
        report.remaining,
        if report.listening { "" } else { ", listener disabled" }
    );
    Ok(())
}

fn cmd_check(path: &Path) -> Result<()> {
    let scenario = Scenario::load(path)?;
    info!("Checking {}", path.display());

    println!(
        "viewport={} content={} scroll={}",
        scenario.page.viewport_height, scenario.page.content_height, scenario.page.scroll_offset
    );
    for row in replay::thresholds(&scenario)? {
        println!("{}", row);
    }
    Ok(())
}
