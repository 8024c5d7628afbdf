//! Silver-layer records and the per-run accumulator.

use indexmap::{IndexMap, IndexSet};

/// Name of the synthetic column appended to every silver record.
pub const PERIOD_COLUMN: &str = "periodo_referencia";

/// One data row of a weekly report.
///
/// `fields` holds the spreadsheet columns that this row's artifact declared, in
/// header order. Columns that only exist in other artifacts are simply absent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SilverRecord {
    pub fields: IndexMap<String, String>,
    pub periodo_referencia: String,
}

impl SilverRecord {
    pub fn get(&self, column: &str) -> Option<&str> {
        if column == PERIOD_COLUMN {
            return Some(&self.periodo_referencia);
        }
        self.fields.get(column).map(String::as_str)
    }
}

/// Rows produced from a single bronze artifact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SilverBatch {
    pub source: String,
    pub columns: Vec<String>,
    pub records: Vec<SilverRecord>,
}

impl SilverBatch {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Accumulated silver records for one pipeline run.
///
/// Grows by concatenation only. The column list is the union of every batch's
/// columns in order of first appearance; `PERIOD_COLUMN` is always emitted last
/// and is never part of `columns`.
#[derive(Debug, Clone, Default)]
pub struct SilverTable {
    columns: IndexSet<String>,
    records: Vec<SilverRecord>,
    sources: Vec<String>,
}

impl SilverTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, batch: &SilverBatch) {
        for column in &batch.columns {
            if column != PERIOD_COLUMN {
                self.columns.insert(column.clone());
            }
        }
        self.records.extend(batch.records.iter().cloned());
        self.sources.push(batch.source.clone());
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn records(&self) -> &[SilverRecord] {
        &self.records
    }

    /// Artifacts appended so far, in append order. Repeats are kept.
    pub fn sources(&self) -> &[String] {
        &self.sources
    }

    /// Output header: unioned source columns, then `periodo_referencia`.
    pub fn header(&self) -> Vec<&str> {
        self.columns
            .iter()
            .map(String::as_str)
            .chain(std::iter::once(PERIOD_COLUMN))
            .collect()
    }
}
