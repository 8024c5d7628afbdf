//! Terminal summaries for pipeline results.
//!
//! Formatting lives here so the pipeline only returns data and the CLI only
//! decides where to print it.

use std::path::Path;

use crate::app::pipeline::{Acquisition, ProcessRun, RangeRun};
use crate::domain::ReportingWindow;

pub fn format_window(window: &ReportingWindow, url: &str) -> String {
    format!(
        "Window: {} .. {} ({})\nFile:   {}\nURL:    {}",
        window.start,
        window.end,
        window.label(),
        window.artifact_name(),
        url
    )
}

pub fn format_acquisition(acq: &Acquisition) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "Bronze: {} available | {} downloaded | {} already present | {} failed\n",
        acq.paths.len(),
        acq.downloaded,
        acq.skipped,
        acq.failures.len()
    ));

    for path in &acq.paths {
        out.push_str(&format!("  ok   {}\n", display_name(path)));
    }
    for f in &acq.failures {
        out.push_str(&format!(
            "  FAIL {} (week {} a {}): {}\n",
            f.date, f.window.start, f.window.end, f.reason
        ));
    }

    out.trim_end().to_string()
}

pub fn format_process_run(run: &ProcessRun) -> String {
    let mut out = format!(
        "Silver: {} artifact(s), {} row(s)\n",
        run.artifacts.len(),
        run.rows
    );
    for (name, rows) in &run.artifacts {
        out.push_str(&format!("  {rows:>6}  {name}\n"));
    }
    out.trim_end().to_string()
}

pub fn format_output(output: Option<&Path>) -> String {
    match output {
        Some(path) => format!("Combined output: {}", path.display()),
        None => "Combined output: nothing to save".to_string(),
    }
}

pub fn format_range_run(run: &RangeRun) -> String {
    let mut out = String::new();
    out.push_str(&format!("=== lpc - weekly range {} .. {} ===\n", run.start, run.end));
    out.push_str(&format_acquisition(&run.acquisition));
    out.push('\n');
    out.push_str(&format_process_run(&run.processed));
    out.push('\n');
    out.push_str(&format_output(run.output.as_deref()));
    out
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;
    use crate::app::pipeline::DownloadFailure;
    use crate::domain::{parse_date, resolve_window};

    #[test]
    fn acquisition_summary_lists_failures() {
        let date = parse_date("2024-01-10").unwrap();
        let acq = Acquisition {
            paths: vec![PathBuf::from(
                "Data/Data-bronze/resumo_semanal_lpc_2024-01-14_2024-01-20.xlsx",
            )],
            downloaded: 1,
            skipped: 0,
            failures: vec![DownloadFailure {
                date,
                window: resolve_window(date),
                url: "https://x/2024/f.xlsx".to_string(),
                reason: "server answered HTTP 404".to_string(),
            }],
        };

        let text = format_acquisition(&acq);
        assert!(
            text.starts_with("Bronze: 1 available | 1 downloaded | 0 already present | 1 failed")
        );
        assert!(text.contains("ok   resumo_semanal_lpc_2024-01-14_2024-01-20.xlsx"));
        assert!(text.contains(
            "FAIL 2024-01-10 (week 2024-01-07 a 2024-01-13): server answered HTTP 404"
        ));
    }

    #[test]
    fn empty_output_is_explicit() {
        assert_eq!(format_output(None), "Combined output: nothing to save");
    }

    #[test]
    fn window_summary_shows_url() {
        let w = resolve_window(parse_date("2024-01-10").unwrap());
        let text = format_window(
            &w,
            "https://x/2024/resumo_semanal_lpc_2024-01-07_2024-01-13.xlsx",
        );
        assert!(text.contains("2024-01-07 a 2024-01-13"));
        assert!(text.contains("File:   resumo_semanal_lpc_2024-01-07_2024-01-13.xlsx"));
    }
}
