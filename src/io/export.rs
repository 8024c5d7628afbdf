//! Silver CSV output.
//!
//! Both the per-artifact files and the combined file share one layout: a header
//! row of source columns followed by `periodo_referencia`, one line per record,
//! empty cells where a record's artifact did not have that column.

use std::path::{Path, PathBuf};

use tracing::info;

use crate::domain::{PERIOD_COLUMN, SilverBatch, SilverRecord, SilverTable};
use crate::error::AppError;
use crate::io::store::DataStores;

/// Write the accumulated table to `<silver>/<file_name>`, replacing any old file.
///
/// Returns `Ok(None)` without touching the filesystem when the table is empty.
pub fn save_silver(
    table: &SilverTable,
    stores: &DataStores,
    file_name: &str,
) -> Result<Option<PathBuf>, AppError> {
    if table.is_empty() {
        info!("No silver records accumulated; nothing to save.");
        return Ok(None);
    }

    let path = stores.silver_path(file_name);
    write_records_csv(&path, &table.header(), table.records())?;
    info!(path = %path.display(), rows = table.len(), "Combined silver data written");
    Ok(Some(path))
}

/// Write one artifact's rows to `<silver>/<artifact stem>.csv`.
pub fn write_batch_csv(batch: &SilverBatch, stores: &DataStores) -> Result<PathBuf, AppError> {
    let stem = Path::new(&batch.source)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(&batch.source);
    let path = stores.silver_path(&format!("{stem}.csv"));

    let header: Vec<&str> = batch
        .columns
        .iter()
        .map(String::as_str)
        .chain(std::iter::once(PERIOD_COLUMN))
        .collect();
    write_records_csv(&path, &header, &batch.records)?;
    Ok(path)
}

fn write_records_csv(
    path: &Path,
    header: &[&str],
    records: &[SilverRecord],
) -> Result<(), AppError> {
    let mut writer = csv::Writer::from_path(path).map_err(|e| {
        AppError::external(format!("Failed to create CSV '{}': {e}", path.display()))
    })?;

    writer
        .write_record(header)
        .map_err(|e| AppError::external(format!("Failed to write CSV header: {e}")))?;

    for record in records {
        writer
            .write_record(header.iter().map(|column| record.get(column).unwrap_or("")))
            .map_err(|e| AppError::external(format!("Failed to write CSV row: {e}")))?;
    }

    writer
        .flush()
        .map_err(|e| AppError::external(format!("Failed to flush CSV '{}': {e}", path.display())))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use indexmap::IndexMap;

    use super::*;

    fn batch(source: &str, columns: &[&str], rows: &[&[&str]]) -> SilverBatch {
        let columns: Vec<String> = columns.iter().map(|c| c.to_string()).collect();
        let records = rows
            .iter()
            .map(|row| SilverRecord {
                fields: columns
                    .iter()
                    .cloned()
                    .zip(row.iter().map(|v| v.to_string()))
                    .collect::<IndexMap<_, _>>(),
                periodo_referencia: "2024-01-07 a 2024-01-13".to_string(),
            })
            .collect();
        SilverBatch {
            source: source.to_string(),
            columns,
            records,
        }
    }

    fn read_lines(path: &Path) -> Vec<String> {
        std::fs::read_to_string(path)
            .unwrap()
            .lines()
            .map(str::to_string)
            .collect()
    }

    #[test]
    fn empty_table_writes_nothing() {
        let tmp = tempfile::tempdir().unwrap();
        let stores = DataStores::open(tmp.path()).unwrap();

        let saved = save_silver(&SilverTable::new(), &stores, "out.csv").unwrap();
        assert_eq!(saved, None);
        assert!(!stores.silver_path("out.csv").exists());
    }

    #[test]
    fn combined_output_unions_columns() {
        let tmp = tempfile::tempdir().unwrap();
        let stores = DataStores::open(tmp.path()).unwrap();

        let mut table = SilverTable::new();
        table.append(&batch("a.xlsx", &["ESTADO", "PRECO"], &[&["SP", "5,59"], &["RJ", "5.71"]]));
        table.append(&batch("b.xlsx", &["ESTADO", "MUNICIPIO"], &[&["BA", "SALVADOR"]]));

        let path = save_silver(&table, &stores, "out.csv").unwrap().unwrap();
        assert_eq!(
            read_lines(&path),
            vec![
                "ESTADO,PRECO,MUNICIPIO,periodo_referencia",
                "SP,\"5,59\",,2024-01-07 a 2024-01-13",
                "RJ,5.71,,2024-01-07 a 2024-01-13",
                "BA,,SALVADOR,2024-01-07 a 2024-01-13",
            ]
        );
    }

    #[test]
    fn saving_twice_overwrites() {
        let tmp = tempfile::tempdir().unwrap();
        let stores = DataStores::open(tmp.path()).unwrap();

        let mut table = SilverTable::new();
        table.append(&batch("a.xlsx", &["X"], &[&["1"]]));
        let first = save_silver(&table, &stores, "out.csv").unwrap().unwrap();
        let second = save_silver(&table, &stores, "out.csv").unwrap().unwrap();

        assert_eq!(first, second);
        assert_eq!(read_lines(&second).len(), 2);
    }

    #[test]
    fn batch_file_is_named_after_artifact() {
        let tmp = tempfile::tempdir().unwrap();
        let stores = DataStores::open(tmp.path()).unwrap();

        let b = batch("resumo_semanal_lpc_2024-01-07_2024-01-13.xlsx", &["X"], &[&["1"]]);
        let path = write_batch_csv(&b, &stores).unwrap();
        assert_eq!(
            path,
            stores.silver_path("resumo_semanal_lpc_2024-01-07_2024-01-13.csv")
        );
        assert_eq!(read_lines(&path), vec!["X,periodo_referencia", "1,2024-01-07 a 2024-01-13"]);
    }
}
