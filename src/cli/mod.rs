//! Command-line parsing for the weekly fuel-price report pipeline.
//!
//! Argument parsing stays separate from the pipeline so the pipeline can be
//! driven from tests without spawning processes.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};

use crate::domain::parse_date;

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(
    name = "lpc",
    version,
    about = "Weekly fuel price reports: download (bronze) and combine (silver)"
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Command,
}

/// Options shared by every subcommand. Unset flags fall back to `LPC_*` env vars.
#[derive(Debug, Args, Clone, Default)]
pub struct GlobalArgs {
    /// Directory holding Data-bronze/ and Data-silver/.
    #[arg(long, global = true, value_name = "DIR")]
    pub data_dir: Option<PathBuf>,

    /// Remote directory the weekly spreadsheets are published under.
    #[arg(long, global = true, value_name = "URL")]
    pub base_url: Option<String>,

    /// HTTP request timeout in seconds.
    #[arg(long, global = true, value_name = "SECS")]
    pub timeout_secs: Option<u64>,

    /// File name of the combined silver CSV.
    #[arg(long, global = true, value_name = "NAME")]
    pub output: Option<String>,

    /// Do not write one silver CSV per processed artifact.
    #[arg(long, global = true)]
    pub no_artifact_csv: bool,

    /// Print results as JSON instead of text.
    #[arg(long, global = true)]
    pub json: bool,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Show the reporting window, file name and URL for a date.
    Window {
        #[arg(value_parser = parse_date, value_name = "YYYY-MM-DD")]
        date: NaiveDate,
    },
    /// Download the weekly reports covering the given dates into the bronze store.
    Download {
        #[arg(value_parser = parse_date, value_name = "YYYY-MM-DD", required = true)]
        dates: Vec<NaiveDate>,
    },
    /// Download week by week from START to END, reprocess the bronze store, save.
    Range {
        #[arg(value_parser = parse_date, value_name = "START")]
        start: NaiveDate,
        #[arg(value_parser = parse_date, value_name = "END")]
        end: NaiveDate,
    },
    /// Process specific bronze files and save the combined output.
    Process {
        #[arg(value_name = "FILE", required = true)]
        files: Vec<PathBuf>,
    },
    /// Reprocess every spreadsheet in the bronze store and save the combined output.
    Reconcile,
}
