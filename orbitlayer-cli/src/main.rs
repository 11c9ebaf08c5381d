//! OrbitLayer CLI - Command-line interface
//!
//! Drives the orbital-state pipeline headlessly and inspects catalogs.

mod commands;
mod error;
mod runner;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use commands::run::RunArgs;
use commands::track::TrackArgs;
use error::CliError;
use runner::CliRunner;

#[derive(Debug, Parser)]
#[command(name = "orbitlayer", version, about = "Real-time orbital-state pipeline")]
struct Cli {
    /// Configuration file (default: ~/.orbitlayer/config.ini)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Propagate the catalog for a number of ticks and print telemetry
    Run {
        /// Compact JSON catalog (overrides [catalog] path)
        #[arg(long)]
        catalog: Option<PathBuf>,

        /// Number of interactive ticks
        #[arg(long, default_value_t = 600)]
        ticks: u64,

        /// Simulation speed-up over real time (overrides [clock] time_scale)
        #[arg(long)]
        time_scale: Option<f64>,

        /// Start instant in Unix seconds (default: now)
        #[arg(long, allow_negative_numbers = true)]
        start: Option<i64>,

        /// Select the first object matching this id or name
        #[arg(long)]
        select: Option<String>,

        /// Do not sleep between ticks
        #[arg(long)]
        fast: bool,
    },

    /// Find an object by catalog number or name
    Search {
        #[arg(long)]
        catalog: Option<PathBuf>,

        /// Exact catalog number or case-insensitive name fragment
        query: String,
    },

    /// Print the synthesized two-line record of a slot
    Tle {
        #[arg(long)]
        catalog: Option<PathBuf>,

        slot: usize,
    },

    /// Print one orbital period of a slot
    Track {
        #[arg(long)]
        catalog: Option<PathBuf>,

        slot: usize,

        /// Intervals along the orbit
        #[arg(long, default_value_t = orbitlayer::track::DEFAULT_TRACK_SAMPLES)]
        samples: usize,

        /// Start instant in Unix seconds (default: now)
        #[arg(long, allow_negative_numbers = true)]
        start: Option<i64>,
    },
}

fn main() {
    let cli = Cli::parse();
    if let Err(e) = dispatch(cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn dispatch(cli: Cli) -> Result<(), CliError> {
    let runner = CliRunner::new(cli.config.as_deref(), cli.verbose)?;

    match cli.command {
        Commands::Run {
            catalog,
            ticks,
            time_scale,
            start,
            select,
            fast,
        } => commands::run::run(
            &runner,
            RunArgs {
                catalog,
                ticks,
                time_scale,
                start,
                select,
                fast,
            },
        ),
        Commands::Search { catalog, query } => commands::catalog::run_search(&runner, catalog, &query),
        Commands::Tle { catalog, slot } => commands::catalog::run_tle(&runner, catalog, slot),
        Commands::Track {
            catalog,
            slot,
            samples,
            start,
        } => commands::track::run(
            &runner,
            TrackArgs {
                catalog,
                slot,
                samples,
                start,
            },
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_run_with_globals() {
        let cli = Cli::try_parse_from([
            "orbitlayer",
            "--verbose",
            "run",
            "--catalog",
            "sats.json",
            "--ticks",
            "5",
            "--fast",
        ])
        .unwrap();
        assert!(cli.verbose);
        match cli.command {
            Commands::Run {
                catalog, ticks, fast, ..
            } => {
                assert_eq!(catalog, Some(PathBuf::from("sats.json")));
                assert_eq!(ticks, 5);
                assert!(fast);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_parse_track_defaults() {
        let cli = Cli::try_parse_from(["orbitlayer", "track", "3"]).unwrap();
        match cli.command {
            Commands::Track { slot, samples, start, .. } => {
                assert_eq!(slot, 3);
                assert_eq!(samples, orbitlayer::track::DEFAULT_TRACK_SAMPLES);
                assert_eq!(start, None);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }
}
