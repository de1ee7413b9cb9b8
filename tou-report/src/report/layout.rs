use std::collections::BTreeMap;

use rust_xlsxwriter::{ColNum, RowNum};
use time::PrimitiveDateTime;
use tou_domain::{BillingPlan, TouBucket};

use crate::report::columns::ColumnMap;

#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Text(String),
    Number(f64),
    /// Spreadsheet formula including the leading `=`.
    Formula(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct HeaderCell {
    pub value: CellValue,
    pub bold: bool,
    pub centered: bool,
}

/// Which sides of a cell carry a border.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Borders {
    pub top: bool,
    pub bottom: bool,
    pub left: bool,
    pub right: bool,
}

impl Borders {
    pub fn union(self, other: Self) -> Self {
        Self {
            top: self.top || other.top,
            bottom: self.bottom || other.bottom,
            left: self.left || other.left,
            right: self.right || other.right,
        }
    }

    pub fn is_empty(self) -> bool {
        self == Self::default()
    }
}

/// Inclusive rectangle of cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellRange {
    pub first_row: RowNum,
    pub first_col: ColNum,
    pub last_row: RowNum,
    pub last_col: ColNum,
}

impl CellRange {
    pub const fn new(first_row: RowNum, first_col: ColNum, last_row: RowNum, last_col: ColNum) -> Self {
        Self {
            first_row,
            first_col,
            last_row,
            last_col,
        }
    }

    pub fn contains(&self, row: RowNum, col: ColNum) -> bool {
        (self.first_row..=self.last_row).contains(&row) && (self.first_col..=self.last_col).contains(&col)
    }

    /// Edges a cell receives when an outer border is drawn around this range.
    /// Corner cells get both of their edges, cells inside get none.
    pub fn outer_edges(&self, row: RowNum, col: ColNum) -> Borders {
        if !self.contains(row, col) {
            return Borders::default();
        }

        Borders {
            top: row == self.first_row,
            bottom: row == self.last_row,
            left: col == self.first_col,
            right: col == self.last_col,
        }
    }
}

/// One data row: a timestamp and a value slot for every column after it.
/// `None` marks a spacer column.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportRow {
    pub timestamp: PrimitiveDateTime,
    pub values: Vec<Option<f64>>,
}

impl ReportRow {
    pub fn value(&self, col: ColNum) -> Option<f64> {
        let idx = usize::from(col).checked_sub(1)?;
        self.values.get(idx).copied().flatten()
    }
}

/// Complete in-memory spreadsheet, ready for a single write pass.
#[derive(Debug, Clone)]
pub struct ReportLayout {
    pub(super) columns: ColumnMap,
    pub(super) header: BTreeMap<(RowNum, ColNum), HeaderCell>,
    pub(super) merges: Vec<CellRange>,
    pub(super) rows: Vec<ReportRow>,
    pub(super) boxes: Vec<CellRange>,
    pub(super) data_first_row: RowNum,
}

impl ReportLayout {
    pub fn columns(&self) -> &ColumnMap {
        &self.columns
    }

    pub fn column_count(&self) -> ColNum {
        self.columns.column_count()
    }

    pub fn header_cell(&self, row: RowNum, col: ColNum) -> Option<&HeaderCell> {
        self.header.get(&(row, col))
    }

    pub fn merges(&self) -> &[CellRange] {
        &self.merges
    }

    pub fn rows(&self) -> &[ReportRow] {
        &self.rows
    }

    pub fn boxes(&self) -> &[CellRange] {
        &self.boxes
    }

    pub fn data_first_row(&self) -> RowNum {
        self.data_first_row
    }

    /// Last data row, or `None` for an export without readings.
    pub fn data_last_row(&self) -> Option<RowNum> {
        let count = RowNum::try_from(self.rows.len()).ok()?;
        count.checked_sub(1).map(|n| self.data_first_row + n)
    }

    pub fn last_row(&self) -> RowNum {
        self.data_last_row().unwrap_or(self.data_first_row - 1)
    }

    /// Data row at an absolute sheet row.
    pub fn row_at(&self, row: RowNum) -> Option<&ReportRow> {
        let idx = row.checked_sub(self.data_first_row)?;
        self.rows.get(usize::try_from(idx).ok()?)
    }

    pub fn borders_at(&self, row: RowNum, col: ColNum) -> Borders {
        self.boxes
            .iter()
            .fold(Borders::default(), |acc, b| acc.union(b.outer_edges(row, col)))
    }

    /// Sum of a value column over all data rows, as the sheet's totals
    /// formula would compute it.
    pub fn column_total(&self, col: ColNum) -> f64 {
        self.rows.iter().filter_map(|r| r.value(col)).sum()
    }

    /// Consumed and generated totals for every plan bucket.
    pub fn bucket_totals(&self) -> Vec<(BillingPlan, TouBucket, f64, f64)> {
        self.columns
            .blocks()
            .iter()
            .flat_map(|block| {
                block.buckets().map(move |c| {
                    (
                        block.plan,
                        c.bucket,
                        self.column_total(c.consumed),
                        self.column_total(c.generated),
                    )
                })
            })
            .collect()
    }
}
