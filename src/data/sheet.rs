//! Spreadsheet decoding.
//!
//! The transform stage works on a plain, headerless grid of strings. Row and
//! column indices in `RawSheet` are sheet-absolute: row 0 is the first row of
//! the worksheet even when it is blank, so fixed offsets keep their meaning.

use std::io::Cursor;

use calamine::{Data, Range, Reader, open_workbook_auto_from_rs};
use chrono::Timelike;

use crate::error::AppError;

/// Headerless table of cell text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawSheet {
    pub rows: Vec<Vec<String>>,
}

impl RawSheet {
    pub fn new(rows: Vec<Vec<String>>) -> Self {
        Self { rows }
    }

    /// Copy a calamine range into an absolute grid, padding leading blanks.
    pub fn from_range(range: &Range<Data>) -> Self {
        let Some((last_row, last_col)) = range.end() else {
            return Self::default();
        };

        let rows = (0..=last_row)
            .map(|r| {
                (0..=last_col)
                    .map(|c| range.get_value((r, c)).map(cell_text).unwrap_or_default())
                    .collect()
            })
            .collect();

        Self { rows }
    }
}

/// `bytes -> RawSheet` for the first worksheet of a workbook.
pub trait SheetParser {
    fn parse(&self, bytes: &[u8]) -> Result<RawSheet, AppError>;
}

/// Reads `.xlsx` (and the other formats calamine detects) from memory.
#[derive(Debug, Clone, Copy, Default)]
pub struct CalamineParser;

impl SheetParser for CalamineParser {
    fn parse(&self, bytes: &[u8]) -> Result<RawSheet, AppError> {
        let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes.to_vec()))
            .map_err(|e| AppError::data(format!("Failed to open spreadsheet: {e}")))?;

        let range = workbook
            .worksheet_range_at(0)
            .ok_or_else(|| AppError::data("Spreadsheet has no worksheets."))?
            .map_err(|e| AppError::data(format!("Failed to read first worksheet: {e}")))?;

        Ok(RawSheet::from_range(&range))
    }
}

fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.clone(),
        Data::Int(i) => i.to_string(),
        Data::Float(f) => f.to_string(),
        Data::Bool(b) => b.to_string(),
        Data::DateTime(dt) => match dt.as_datetime() {
            Some(ts) if ts.time().num_seconds_from_midnight() == 0 => {
                ts.format("%Y-%m-%d").to_string()
            }
            Some(ts) => ts.format("%Y-%m-%d %H:%M:%S").to_string(),
            None => cell.to_string(),
        },
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_range_keeps_absolute_positions() {
        let mut range: Range<Data> = Range::new((2, 1), (3, 2));
        range.set_value((2, 1), Data::String("PRODUTO".to_string()));
        range.set_value((3, 1), Data::String("GLP".to_string()));
        range.set_value((3, 2), Data::Float(104.5));

        let sheet = RawSheet::from_range(&range);
        assert_eq!(sheet.rows.len(), 4);
        assert!(sheet.rows[0].iter().all(String::is_empty));
        assert_eq!(sheet.rows[2], vec!["", "PRODUTO", ""]);
        assert_eq!(sheet.rows[3], vec!["", "GLP", "104.5"]);
    }

    #[test]
    fn empty_range_is_empty_sheet() {
        let range: Range<Data> = Range::empty();
        assert!(RawSheet::from_range(&range).rows.is_empty());
    }

    #[test]
    fn scalar_cells_render_as_text() {
        assert_eq!(cell_text(&Data::Empty), "");
        assert_eq!(cell_text(&Data::Int(7)), "7");
        assert_eq!(cell_text(&Data::Float(5.89)), "5.89");
        assert_eq!(cell_text(&Data::Bool(true)), "true");
    }

    #[test]
    fn real_workbook_keeps_sheet_row_numbers() {
        use rust_xlsxwriter::Workbook;

        // Rows 0-1 blank, title on row 2, header on row 9, one gap in the data.
        let mut workbook = Workbook::new();
        let ws = workbook.add_worksheet();
        ws.write_string(2, 0, "SÍNTESE SEMANAL DO COMPORTAMENTO DOS PREÇOS").unwrap();
        ws.write_string(9, 0, "ESTADO").unwrap();
        ws.write_string(9, 1, "PRODUTO").unwrap();
        ws.write_string(9, 2, "PREÇO MÉDIO REVENDA").unwrap();
        ws.write_string(10, 0, "SAO PAULO").unwrap();
        ws.write_string(10, 1, "GASOLINA COMUM").unwrap();
        ws.write_number(10, 2, 5.59).unwrap();
        ws.write_string(12, 0, "BAHIA").unwrap();
        let bytes = workbook.save_to_buffer().unwrap();

        let sheet = CalamineParser.parse(&bytes).unwrap();
        assert_eq!(sheet.rows.len(), 13);
        assert!(sheet.rows[0].iter().all(String::is_empty));
        assert_eq!(sheet.rows[2][0], "SÍNTESE SEMANAL DO COMPORTAMENTO DOS PREÇOS");
        assert_eq!(sheet.rows[9], vec!["ESTADO", "PRODUTO", "PREÇO MÉDIO REVENDA"]);
        assert_eq!(sheet.rows[10], vec!["SAO PAULO", "GASOLINA COMUM", "5.59"]);
        assert!(sheet.rows[11].iter().all(String::is_empty));

        let batch = crate::io::build_batch(
            "resumo_semanal_lpc_2024-01-07_2024-01-13.xlsx",
            &sheet,
        )
        .unwrap();
        assert_eq!(batch.columns, vec!["ESTADO", "PRODUTO", "PREÇO MÉDIO REVENDA"]);
        assert_eq!(batch.len(), 3);
        assert_eq!(batch.records[1].get("ESTADO"), Some(""));
        assert_eq!(batch.records[2].get("ESTADO"), Some("BAHIA"));
    }

    #[test]
    fn garbage_bytes_are_a_data_error() {
        let err = CalamineParser.parse(b"definitely not a workbook").unwrap_err();
        assert_eq!(err.exit_code(), crate::error::EXIT_DATA);
    }
}
