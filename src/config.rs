//! Run configuration.
//!
//! Values come from the environment (a `.env` file is loaded first, if present)
//! and can then be overridden by CLI flags in `app`.

use std::path::PathBuf;
use std::time::Duration;

use serde::Serialize;

use crate::error::AppError;

pub const DEFAULT_BASE_URL: &str =
    "https://www.gov.br/anp/pt-br/assuntos/precos-e-defesa-da-concorrencia/precos/arquivos-lpc";
pub const DEFAULT_DATA_DIR: &str = "Data";
pub const DEFAULT_OUTPUT_NAME: &str = "dados_combustiveis_anp.csv";
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

pub const BRONZE_DIR_NAME: &str = "Data-bronze";
pub const SILVER_DIR_NAME: &str = "Data-silver";

const ENV_BASE_URL: &str = "LPC_BASE_URL";
const ENV_DATA_DIR: &str = "LPC_DATA_DIR";
const ENV_TIMEOUT: &str = "LPC_HTTP_TIMEOUT_SECS";
const ENV_OUTPUT_NAME: &str = "LPC_OUTPUT_NAME";
const ENV_ARTIFACT_CSV: &str = "LPC_WRITE_ARTIFACT_CSV";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PipelineConfig {
    /// Remote directory holding `<year>/resumo_semanal_lpc_*.xlsx`.
    pub base_url: String,
    /// Parent of `Data-bronze` and `Data-silver`.
    pub data_dir: PathBuf,
    /// Per-request HTTP timeout.
    pub timeout: Duration,
    /// File name of the combined silver output.
    pub output_name: String,
    /// Also write one silver CSV per processed artifact.
    pub write_artifact_csv: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            output_name: DEFAULT_OUTPUT_NAME.to_string(),
            write_artifact_csv: true,
        }
    }
}

impl PipelineConfig {
    pub fn from_env() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup; unset keys keep their defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(url) = non_empty(lookup(ENV_BASE_URL)) {
            config.base_url = url;
        }
        if let Some(dir) = non_empty(lookup(ENV_DATA_DIR)) {
            config.data_dir = PathBuf::from(dir);
        }
        if let Some(raw) = non_empty(lookup(ENV_TIMEOUT)) {
            config.timeout = parse_timeout(&raw)?;
        }
        if let Some(name) = non_empty(lookup(ENV_OUTPUT_NAME)) {
            config.output_name = name;
        }
        if let Some(raw) = non_empty(lookup(ENV_ARTIFACT_CSV)) {
            config.write_artifact_csv = parse_flag(ENV_ARTIFACT_CSV, &raw)?;
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), AppError> {
        if self.timeout.is_zero() {
            return Err(AppError::usage("HTTP timeout must be > 0 seconds."));
        }
        if self.output_name.contains(['/', '\\']) {
            return Err(AppError::usage(format!(
                "Output name '{}' must be a bare file name.",
                self.output_name
            )));
        }
        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            return Err(AppError::usage(format!(
                "Base URL '{}' must start with http:// or https://.",
                self.base_url
            )));
        }
        Ok(())
    }

    pub fn bronze_dir(&self) -> PathBuf {
        self.data_dir.join(BRONZE_DIR_NAME)
    }

    pub fn silver_dir(&self) -> PathBuf {
        self.data_dir.join(SILVER_DIR_NAME)
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

pub fn parse_timeout(raw: &str) -> Result<Duration, AppError> {
    let secs: u64 = raw
        .trim()
        .parse()
        .map_err(|e| AppError::usage(format!("Invalid {ENV_TIMEOUT} '{raw}': {e}")))?;
    Ok(Duration::from_secs(secs))
}

fn parse_flag(key: &str, raw: &str) -> Result<bool, AppError> {
    match raw.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(AppError::usage(format!("Invalid {key} '{raw}' (expected true/false)."))),
    }
}
