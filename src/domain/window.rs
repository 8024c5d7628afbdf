//! Weekly reporting windows and the names derived from them.
//!
//! The price survey is published once per Sunday..Saturday week. Everything the
//! pipeline names (remote URL, bronze file, period label) is a pure function of
//! the window, so this module has no I/O.

use chrono::{Datelike, Duration, NaiveDate};
use serde::Serialize;

use crate::error::AppError;

/// Prefix shared by the remote resource and the bronze file name.
pub const ARTIFACT_PREFIX: &str = "resumo_semanal_lpc";
pub const ARTIFACT_EXT: &str = ".xlsx";

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Inclusive Sunday..Saturday span covered by one weekly report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct ReportingWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl ReportingWindow {
    /// Resolve the window for a `YYYY-MM-DD` string.
    pub fn resolve_str(raw: &str) -> Result<Self, AppError> {
        Ok(resolve_window(parse_date(raw)?))
    }

    /// Bronze file name: `resumo_semanal_lpc_<start>_<end>.xlsx`.
    pub fn artifact_name(&self) -> String {
        format!(
            "{ARTIFACT_PREFIX}_{}_{}{ARTIFACT_EXT}",
            self.start.format(DATE_FORMAT),
            self.end.format(DATE_FORMAT)
        )
    }

    /// Human-readable label, same shape as the one derived from file names.
    pub fn label(&self) -> String {
        format!(
            "{} a {}",
            self.start.format(DATE_FORMAT),
            self.end.format(DATE_FORMAT)
        )
    }
}

/// Parse a date in strict `YYYY-MM-DD` form (zero padded).
pub fn parse_date(raw: &str) -> Result<NaiveDate, AppError> {
    let trimmed = raw.trim();
    let date = NaiveDate::parse_from_str(trimmed, DATE_FORMAT)
        .map_err(|e| AppError::usage(format!("Invalid date '{raw}' (expected YYYY-MM-DD): {e}")))?;

    // chrono accepts unpadded fields ("2024-1-7"); the canonical form does not.
    if date.format(DATE_FORMAT).to_string() != trimmed {
        return Err(AppError::usage(format!(
            "Invalid date '{raw}' (expected zero-padded YYYY-MM-DD)."
        )));
    }

    Ok(date)
}

/// Compute the reporting window that the publisher files `date` under.
///
/// `start = date - (weekday_from_monday + 1)` days. A Sunday has index 6, so it
/// rolls back a full week and lands in the *previous* window, not the one it
/// opens. Every other weekday lands in the window that contains it.
pub fn resolve_window(date: NaiveDate) -> ReportingWindow {
    let back = i64::from(date.weekday().num_days_from_monday()) + 1;
    let start = date - Duration::days(back);
    ReportingWindow {
        start,
        end: start + Duration::days(6),
    }
}

/// `<base>/<year(start)>/resumo_semanal_lpc_<start>_<end>.xlsx`
pub fn build_resource_url(base_url: &str, window: &ReportingWindow) -> String {
    format!(
        "{}/{}/{}",
        base_url.trim_end_matches('/'),
        window.start.year(),
        window.artifact_name()
    )
}

/// Derive the `periodo_referencia` value from a bronze file name.
///
/// Takes the last two `_`-separated tokens and strips the `.xlsx` suffix, so
/// `resumo_semanal_lpc_2024-01-07_2024-01-13.xlsx` becomes
/// `2024-01-07 a 2024-01-13`. The tokens are not validated as dates.
pub fn period_label_from_filename(file_name: &str) -> Result<String, AppError> {
    let tokens: Vec<&str> = file_name.split('_').collect();
    if tokens.len() < 2 {
        return Err(AppError::data(format!(
            "Cannot derive reference period from file name '{file_name}'."
        )));
    }

    let first = tokens[tokens.len() - 2];
    let last = tokens[tokens.len() - 1].replace(ARTIFACT_EXT, "");
    Ok(format!("{first} a {last}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Weekday;

    const BASE: &str = "https://example.gov/lpc";

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn wednesday_resolves_to_enclosing_week() {
        let w = resolve_window(d(2024, 1, 10));
        assert_eq!(w.start, d(2024, 1, 7));
        assert_eq!(w.end, d(2024, 1, 13));
        assert_eq!(
            build_resource_url(BASE, &w),
            "https://example.gov/lpc/2024/resumo_semanal_lpc_2024-01-07_2024-01-13.xlsx"
        );
    }

    #[test]
    fn sunday_resolves_to_previous_week() {
        let sunday = d(2024, 1, 14);
        assert_eq!(sunday.weekday(), Weekday::Sun);

        let w = resolve_window(sunday);
        assert_eq!(w.start, sunday - Duration::days(7));
        assert_eq!(w.end, d(2024, 1, 13));
    }

    #[test]
    fn saturday_and_monday_stay_in_their_week() {
        assert_eq!(resolve_window(d(2024, 1, 13)).start, d(2024, 1, 7));
        assert_eq!(resolve_window(d(2024, 1, 8)).start, d(2024, 1, 7));
    }

    #[test]
    fn every_window_is_sunday_to_saturday() {
        let mut date = d(2023, 12, 1);
        while date <= d(2024, 3, 31) {
            let w = resolve_window(date);
            assert_eq!(w.start.weekday(), Weekday::Sun, "start for {date}");
            assert_eq!(w.end - w.start, Duration::days(6), "span for {date}");
            assert!(w.start < date, "start must precede {date}");
            date += Duration::days(1);
        }
    }

    #[test]
    fn url_year_follows_window_start() {
        // Tuesday 2024-01-02 belongs to the week starting Sunday 2023-12-31.
        let w = resolve_window(d(2024, 1, 2));
        assert_eq!(w.start, d(2023, 12, 31));
        assert_eq!(
            build_resource_url(&format!("{BASE}/"), &w),
            "https://example.gov/lpc/2023/resumo_semanal_lpc_2023-12-31_2024-01-06.xlsx"
        );
    }

    #[test]
    fn url_is_deterministic() {
        let w = ReportingWindow::resolve_str("2024-06-19").unwrap();
        assert_eq!(build_resource_url(BASE, &w), build_resource_url(BASE, &w));
    }

    #[test]
    fn parse_date_is_strict() {
        assert_eq!(parse_date("2024-01-10").unwrap(), d(2024, 1, 10));
        assert!(parse_date("2024-1-10").is_err());
        assert!(parse_date("10/01/2024").is_err());
        assert!(parse_date("2024-02-30").is_err());

        let err = parse_date("not-a-date").unwrap_err();
        assert_eq!(err.exit_code(), crate::error::EXIT_USAGE);
    }

    #[test]
    fn period_label_comes_from_file_name() {
        let label =
            period_label_from_filename("resumo_semanal_lpc_2024-01-07_2024-01-13.xlsx").unwrap();
        assert_eq!(label, "2024-01-07 a 2024-01-13");

        let w = resolve_window(d(2024, 1, 10));
        assert_eq!(period_label_from_filename(&w.artifact_name()).unwrap(), w.label());
    }

    #[test]
    fn period_label_needs_two_tokens() {
        assert!(period_label_from_filename("planilha.xlsx").is_err());
        assert_eq!(period_label_from_filename("a_b.xlsx").unwrap(), "a a b");
    }
}
