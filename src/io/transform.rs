//! Bronze artifact -> silver batch.
//!
//! The weekly report has a fixed layout: a ten-row preamble (titles, notes,
//! blank lines) followed by the column header on sheet row index 9 and the
//! data rows after it. That offset belongs to the publisher's layout and is
//! not configurable.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use indexmap::IndexMap;

use crate::data::{RawSheet, SheetParser};
use crate::domain::{
    PERIOD_COLUMN, SilverBatch, SilverRecord, SilverTable, period_label_from_filename,
};
use crate::error::AppError;

/// 0-based sheet row holding the column names.
pub const HEADER_ROW: usize = 9;

/// Parse one bronze file, append its rows to `table`, and return them.
///
/// Layout violations are returned as errors; nothing is appended in that case.
pub fn process_artifact<P>(
    path: &Path,
    parser: &P,
    table: &mut SilverTable,
) -> Result<SilverBatch, AppError>
where
    P: SheetParser + ?Sized,
{
    let batch = load_batch(path, parser)?;
    table.append(&batch);
    Ok(batch)
}

/// Parse one bronze file into a batch without touching any accumulator.
pub fn load_batch<P>(path: &Path, parser: &P) -> Result<SilverBatch, AppError>
where
    P: SheetParser + ?Sized,
{
    let file_name = path.file_name().and_then(|n| n.to_str()).ok_or_else(|| {
        AppError::data(format!("Artifact path '{}' has no file name.", path.display()))
    })?;

    let bytes = fs::read(path)
        .map_err(|e| AppError::external(format!("Failed to read '{}': {e}", path.display())))?;

    let sheet = parser
        .parse(&bytes)
        .map_err(|e| AppError::new(e.exit_code(), format!("{file_name}: {e}")))?;

    build_batch(file_name, &sheet)
}

/// Reshape a parsed sheet into silver records labelled from `file_name`.
pub fn build_batch(file_name: &str, sheet: &RawSheet) -> Result<SilverBatch, AppError> {
    if sheet.rows.len() <= HEADER_ROW {
        return Err(AppError::data(format!(
            "{file_name}: expected the header on row {}, but the sheet has only {} row(s).",
            HEADER_ROW + 1,
            sheet.rows.len()
        )));
    }

    let header_cells = &sheet.rows[HEADER_ROW];
    if is_blank_row(header_cells) {
        return Err(AppError::data(format!(
            "{file_name}: header row {} is empty.",
            HEADER_ROW + 1
        )));
    }

    let periodo_referencia = period_label_from_filename(file_name)?;

    // Every row after the header is data, blank ones included. Only the
    // trailing blank rows (padding up to the used range) are cut.
    let body = &sheet.rows[HEADER_ROW + 1..];
    let used = body
        .iter()
        .rposition(|row| !is_blank_row(row))
        .map_or(0, |last| last + 1);
    let data_rows: Vec<&Vec<String>> = body[..used].iter().collect();

    let width = data_rows
        .iter()
        .map(|row| row.len())
        .chain(std::iter::once(header_cells.len()))
        .max()
        .unwrap_or(0);
    let columns = column_names(header_cells, width);

    let records = data_rows
        .into_iter()
        .map(|row| {
            let fields: IndexMap<String, String> = columns
                .iter()
                .enumerate()
                .map(|(idx, name)| (name.clone(), row.get(idx).cloned().unwrap_or_default()))
                .collect();
            SilverRecord {
                fields,
                periodo_referencia: periodo_referencia.clone(),
            }
        })
        .collect();

    Ok(SilverBatch {
        source: file_name.to_string(),
        columns,
        records,
    })
}

/// Header text per column: blanks become `unnamed_<idx>`, repeats get `.1`, `.2`, ...
fn column_names(header: &[String], width: usize) -> Vec<String> {
    let mut seen: HashSet<String> = HashSet::new();
    let mut out = Vec::with_capacity(width);

    for idx in 0..width {
        let raw = header.get(idx).map(|s| s.trim()).unwrap_or("");
        let base = if raw.is_empty() {
            format!("unnamed_{idx}")
        } else if raw == PERIOD_COLUMN {
            // The derived column always wins; keep the source value under another name.
            format!("{raw}_original")
        } else {
            raw.to_string()
        };

        let mut name = base.clone();
        let mut n = 1;
        while seen.contains(&name) {
            name = format!("{base}.{n}");
            n += 1;
        }
        seen.insert(name.clone());
        out.push(name);
    }

    out
}

fn is_blank_row(row: &[String]) -> bool {
    row.iter().all(|cell| cell.trim().is_empty())
}
