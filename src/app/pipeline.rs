//! One pipeline run: dates -> windows -> URLs -> bronze files -> silver rows -> CSV.
//!
//! `Pipeline` owns everything a run mutates (the bronze/silver stores and the
//! silver accumulator), so the CLI only has to build one and call into it.

use std::path::{Path, PathBuf};

use chrono::{Duration, NaiveDate};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::PipelineConfig;
use crate::data::{CalamineParser, FetchError, Fetcher, HttpFetcher, SheetParser};
use crate::domain::{ReportingWindow, SilverBatch, SilverTable, build_resource_url, resolve_window};
use crate::error::AppError;
use crate::io::{DataStores, load_batch, save_silver, write_batch_csv};

/// A date whose weekly report could not be downloaded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DownloadFailure {
    pub date: NaiveDate,
    pub window: ReportingWindow,
    pub url: String,
    pub reason: String,
}

/// Result of `download_for_dates`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Acquisition {
    /// Bronze files available for the requested dates, in input order.
    pub paths: Vec<PathBuf>,
    pub downloaded: usize,
    pub skipped: usize,
    pub failures: Vec<DownloadFailure>,
}

impl Acquisition {
    fn merge(&mut self, other: Acquisition) {
        self.paths.extend(other.paths);
        self.downloaded += other.downloaded;
        self.skipped += other.skipped;
        self.failures.extend(other.failures);
    }
}

/// Result of processing a set of bronze files.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ProcessRun {
    /// `(file name, data rows)` per processed artifact.
    pub artifacts: Vec<(String, usize)>,
    pub rows: usize,
}

/// Result of `download_and_process_range`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RangeRun {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub acquisition: Acquisition,
    pub processed: ProcessRun,
    pub output: Option<PathBuf>,
}

pub struct Pipeline<F = HttpFetcher, P = CalamineParser> {
    config: PipelineConfig,
    stores: DataStores,
    fetcher: F,
    parser: P,
    table: SilverTable,
}

impl Pipeline {
    /// Production pipeline: HTTP downloads and calamine parsing.
    pub fn from_config(config: PipelineConfig) -> Result<Self, AppError> {
        let fetcher = HttpFetcher::new(config.timeout)?;
        Self::with_parts(config, fetcher, CalamineParser)
    }
}

impl<F: Fetcher, P: SheetParser> Pipeline<F, P> {
    /// Creates the bronze and silver directories before anything else runs.
    pub fn with_parts(config: PipelineConfig, fetcher: F, parser: P) -> Result<Self, AppError> {
        config.validate()?;
        let stores = DataStores::from_config(&config)?;
        Ok(Self {
            config,
            stores,
            fetcher,
            parser,
            table: SilverTable::new(),
        })
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn stores(&self) -> &DataStores {
        &self.stores
    }

    pub fn table(&self) -> &SilverTable {
        &self.table
    }

    /// Window and URL for a date, without touching the network.
    pub fn locate(&self, date: NaiveDate) -> (ReportingWindow, String) {
        let window = resolve_window(date);
        let url = build_resource_url(&self.config.base_url, &window);
        (window, url)
    }

    /// Make sure the bronze file for each date's window exists.
    ///
    /// A file already in the bronze store counts as acquired and is not
    /// fetched again. Download failures are logged and collected; they never
    /// stop the loop. Only filesystem errors are returned as `Err`.
    pub fn download_for_dates(&self, dates: &[NaiveDate]) -> Result<Acquisition, AppError> {
        let mut out = Acquisition::default();

        for &date in dates {
            let (window, url) = self.locate(date);
            let file_name = window.artifact_name();

            if self.stores.has_bronze(&file_name) {
                info!(file = %file_name, "Bronze file already present; skipping download");
                out.paths.push(self.stores.bronze_path(&file_name));
                out.skipped += 1;
                continue;
            }

            debug!(%date, %url, "Fetching weekly report");
            match self.fetcher.fetch(&url) {
                Ok(bytes) => {
                    let path = self.stores.write_bronze(&file_name, &bytes)?;
                    info!(start = %window.start, bytes = bytes.len(), "Weekly report downloaded");
                    out.paths.push(path);
                    out.downloaded += 1;
                }
                Err(err) => {
                    warn!(
                        start = %window.start,
                        %url,
                        error = %err,
                        "Weekly report download failed"
                    );
                    out.failures.push(DownloadFailure {
                        date,
                        window,
                        url,
                        reason: describe_failure(&err),
                    });
                }
            }
        }

        Ok(out)
    }

    /// Parse one bronze file into the accumulator and return its rows.
    ///
    /// The per-artifact CSV (when enabled) is written before the rows are
    /// appended, so any error leaves the accumulator unchanged.
    pub fn process_artifact(&mut self, path: &Path) -> Result<SilverBatch, AppError> {
        let batch = load_batch(path, &self.parser)?;

        if self.config.write_artifact_csv {
            let silver = write_batch_csv(&batch, &self.stores)?;
            info!(path = %silver.display(), rows = batch.len(), "Artifact silver data written");
        } else {
            info!(file = %batch.source, rows = batch.len(), "Artifact processed");
        }

        self.table.append(&batch);
        Ok(batch)
    }

    /// Process the given bronze files in order; the first failure aborts.
    pub fn process_paths(&mut self, paths: &[PathBuf]) -> Result<ProcessRun, AppError> {
        let mut run = ProcessRun::default();
        for path in paths {
            let batch = self.process_artifact(path)?;
            run.rows += batch.len();
            run.artifacts.push((batch.source, batch.records.len()));
        }
        Ok(run)
    }

    /// Reprocess every `*.xlsx` currently in the bronze store.
    ///
    /// This is a full directory scan, not just the files fetched in this run,
    /// so files acquired earlier are appended again. A malformed artifact
    /// aborts the whole batch.
    pub fn reconcile_bronze(&mut self) -> Result<ProcessRun, AppError> {
        let paths = self.stores.list_bronze_artifacts()?;
        info!(
            count = paths.len(),
            dir = %self.stores.bronze_dir().display(),
            "Reprocessing bronze store"
        );
        self.process_paths(&paths)
    }

    /// Write the accumulator to `<silver>/<file_name>`; `None` when it is empty.
    ///
    /// The accumulator is not cleared, so saving again rewrites the same rows.
    pub fn save_silver(&self, file_name: &str) -> Result<Option<PathBuf>, AppError> {
        save_silver(&self.table, &self.stores, file_name)
    }

    /// Save under the configured output name.
    pub fn save_default(&self) -> Result<Option<PathBuf>, AppError> {
        self.save_silver(&self.config.output_name)
    }

    /// Weekly acquisition from `start` to `end`, then reconcile and save.
    ///
    /// The loop steps the raw input date by 7 days (inclusive of `end`); it is
    /// not aligned to window starts.
    pub fn download_and_process_range(
        &mut self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<RangeRun, AppError> {
        let mut acquisition = Acquisition::default();
        let mut current = start;
        while current <= end {
            acquisition.merge(self.download_for_dates(&[current])?);
            current += Duration::weeks(1);
        }

        let processed = self.reconcile_bronze()?;
        let output = self.save_default()?;

        Ok(RangeRun {
            start,
            end,
            acquisition,
            processed,
            output,
        })
    }
}

fn describe_failure(err: &FetchError) -> String {
    match err {
        FetchError::Status(code) => format!("server answered HTTP {code}"),
        FetchError::Transport(msg) => msg.clone(),
    }
}
