#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! CLI entry point for the data collection toolchain.
//!
//! Without a subcommand this runs one collection round against
//! `config.json`. Logging goes through [`data_collect_cli_utils::init_logger`],
//! which shares the terminal with progress bars and tees every line into
//! the log file.

mod commands;
mod interactive;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use data_collect_config::DEFAULT_CONFIG_FILE;
use data_collect_demo::cat_facts::{CAT_FACTS_FILE, DEFAULT_FACT_COUNT};
use data_collect_demo::holidays::{DEFAULT_COUNTRIES, DEFAULT_HOLIDAY_YEAR};

#[derive(Parser)]
#[command(
    name = "data_collect",
    about = "Collect, score, and report on public API datasets"
)]
struct Cli {
    /// File every log line is appended to
    #[arg(long, global = true, default_value = "collection.log")]
    log_file: PathBuf,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Collect records, then write metadata and quality reports
    Collect {
        /// Configuration file (JSON, or TOML by extension)
        #[arg(long, default_value = DEFAULT_CONFIG_FILE)]
        config: PathBuf,
        /// Number of collection rounds
        #[arg(long, default_value = "1")]
        rounds: u32,
    },
    /// Request the configured endpoint once and print what came back
    Probe {
        /// Configuration file (JSON, or TOML by extension)
        #[arg(long, default_value = DEFAULT_CONFIG_FILE)]
        config: PathBuf,
    },
    /// Fetch random cat facts and save them as JSON
    CatFacts {
        /// Number of facts to request
        #[arg(long, default_value_t = DEFAULT_FACT_COUNT)]
        count: usize,
        /// Output file
        #[arg(long, default_value = CAT_FACTS_FILE)]
        output: PathBuf,
    },
    /// List public holidays per country
    Holidays {
        /// Year to list
        #[arg(long, default_value_t = DEFAULT_HOLIDAY_YEAR)]
        year: i32,
        /// Comma-separated ISO country codes (e.g., "US,CA,GB")
        #[arg(long, value_delimiter = ',')]
        countries: Option<Vec<String>>,
    },
    /// Choose a tool from a menu
    Interactive,
}

fn default_countries() -> Vec<String> {
    DEFAULT_COUNTRIES.iter().map(ToString::to_string).collect()
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let multi = data_collect_cli_utils::init_logger(&cli.log_file)?;

    match cli.command {
        None => {
            commands::collect(&PathBuf::from(DEFAULT_CONFIG_FILE), 1, &multi).await?;
        }
        Some(Commands::Collect { config, rounds }) => {
            commands::collect(&config, rounds, &multi).await?;
        }
        Some(Commands::Probe { config }) => commands::probe(&config).await?,
        Some(Commands::CatFacts { count, output }) => {
            commands::cat_facts(count, &output, &multi).await?;
        }
        Some(Commands::Holidays { year, countries }) => {
            let countries = countries.unwrap_or_else(default_countries);
            commands::holidays(&countries, year).await?;
        }
        Some(Commands::Interactive) => interactive::run(&multi).await?,
    }

    Ok(())
}
