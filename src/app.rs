//! Top-level application orchestration.
//!
//! `src/main.rs` only maps errors to exit codes; this module:
//! - initialises logging
//! - parses CLI arguments and resolves the run configuration
//! - drives a `Pipeline` for the chosen subcommand
//! - prints summaries (text or JSON)

use clap::Parser;
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, Command, GlobalArgs};
use crate::config::PipelineConfig;
use crate::domain::{build_resource_url, resolve_window};
use crate::error::AppError;
use crate::report;

pub mod pipeline;

use pipeline::{Pipeline, ProcessRun};

/// Entry point for the `lpc` binary.
pub fn run() -> Result<(), AppError> {
    init_tracing();

    let cli = Cli::parse();
    let config = resolve_config(&cli.global)?;
    let json = cli.global.json;

    match cli.command {
        Command::Window { date } => {
            let window = resolve_window(date);
            let url = build_resource_url(&config.base_url, &window);
            if json {
                #[derive(Serialize)]
                struct WindowOut<'a> {
                    start: chrono::NaiveDate,
                    end: chrono::NaiveDate,
                    file: String,
                    url: &'a str,
                }
                print_json(&WindowOut {
                    start: window.start,
                    end: window.end,
                    file: window.artifact_name(),
                    url: &url,
                })
            } else {
                println!("{}", report::format_window(&window, &url));
                Ok(())
            }
        }
        Command::Download { dates } => {
            let pipeline = Pipeline::from_config(config)?;
            let acq = pipeline.download_for_dates(&dates)?;
            emit(json, &acq, || report::format_acquisition(&acq))
        }
        Command::Range { start, end } => {
            if end < start {
                return Err(AppError::usage(format!(
                    "Range end {end} is before start {start}."
                )));
            }
            let mut pipeline = Pipeline::from_config(config)?;
            let run = pipeline.download_and_process_range(start, end)?;
            emit(json, &run, || report::format_range_run(&run))
        }
        Command::Process { files } => {
            let mut pipeline = Pipeline::from_config(config)?;
            let processed = pipeline.process_paths(&files)?;
            finish_processing(&pipeline, processed, json)
        }
        Command::Reconcile => {
            let mut pipeline = Pipeline::from_config(config)?;
            let processed = pipeline.reconcile_bronze()?;
            finish_processing(&pipeline, processed, json)
        }
    }
}

/// Environment first, then CLI flags on top.
pub fn resolve_config(global: &GlobalArgs) -> Result<PipelineConfig, AppError> {
    let mut config = PipelineConfig::from_env()?;
    apply_overrides(&mut config, global);
    config.validate()?;
    Ok(config)
}

pub fn apply_overrides(config: &mut PipelineConfig, global: &GlobalArgs) {
    if let Some(dir) = &global.data_dir {
        config.data_dir = dir.clone();
    }
    if let Some(url) = &global.base_url {
        config.base_url = url.clone();
    }
    if let Some(secs) = global.timeout_secs {
        config.timeout = std::time::Duration::from_secs(secs);
    }
    if let Some(name) = &global.output {
        config.output_name = name.clone();
    }
    if global.no_artifact_csv {
        config.write_artifact_csv = false;
    }
}

fn finish_processing<F, P>(
    pipeline: &Pipeline<F, P>,
    processed: ProcessRun,
    json: bool,
) -> Result<(), AppError>
where
    F: crate::data::Fetcher,
    P: crate::data::SheetParser,
{
    let output = pipeline.save_default()?;

    if json {
        #[derive(Serialize)]
        struct ProcessOut {
            processed: ProcessRun,
            output: Option<std::path::PathBuf>,
        }
        return print_json(&ProcessOut { processed, output });
    }

    println!("{}", report::format_process_run(&processed));
    println!("{}", report::format_output(output.as_deref()));
    Ok(())
}

fn emit<T, F>(json: bool, value: &T, text: F) -> Result<(), AppError>
where
    T: Serialize,
    F: FnOnce() -> String,
{
    if json {
        print_json(value)
    } else {
        println!("{}", text());
        Ok(())
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<(), AppError> {
    let text = serde_json::to_string_pretty(value)
        .map_err(|e| AppError::external(format!("Failed to serialize JSON output: {e}")))?;
    println!("{text}");
    Ok(())
}

/// Log to stderr; `RUST_LOG` overrides the default `info` level.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    // A subscriber may already be installed by an embedding program.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;
    use std::time::Duration;

    use super::*;

    #[test]
    fn cli_flags_override_config() {
        let mut config = PipelineConfig::default();
        let global = GlobalArgs {
            data_dir: Some(PathBuf::from("/srv/anp")),
            base_url: Some("http://mirror.local/lpc".to_string()),
            timeout_secs: Some(5),
            output: Some("all.csv".to_string()),
            no_artifact_csv: true,
            json: false,
        };

        apply_overrides(&mut config, &global);

        assert_eq!(config.data_dir, PathBuf::from("/srv/anp"));
        assert_eq!(config.base_url, "http://mirror.local/lpc");
        assert_eq!(config.timeout, Duration::from_secs(5));
        assert_eq!(config.output_name, "all.csv");
        assert!(!config.write_artifact_csv);
    }

    #[test]
    fn unset_flags_keep_config() {
        let mut config = PipelineConfig::default();
        apply_overrides(&mut config, &GlobalArgs::default());
        assert_eq!(config, PipelineConfig::default());
    }
}
