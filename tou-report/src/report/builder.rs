use std::collections::BTreeMap;

use rust_xlsxwriter::{
    utility::{cell_range, row_col_to_cell},
    ColNum, RowNum,
};
use tou_domain::{RateSchedule, ReadingPair};

use crate::{
    pipeline::PipelineError,
    report::{
        columns::{ColumnMap, TIMESTAMP_COL},
        CellRange, CellValue, HeaderCell, ReportLayout,
    },
    transform::TouClassification,
};

pub const TITLE_ROW: RowNum = 0;
pub const BUCKET_ROW: RowNum = 1;
pub const TOTAL_ROW: RowNum = 2;
pub const NET_ROW: RowNum = 3;
pub const LABEL_ROW: RowNum = 4;
pub const DATA_FIRST_ROW: RowNum = 5;

/// Builds the report in three phases: header skeleton, data rows, then
/// totals and borders once the data extent is known.
#[derive(Debug, Clone)]
pub struct ReportBuilder {
    classification: TouClassification,
}

impl ReportBuilder {
    pub fn new(schedule: RateSchedule) -> Self {
        Self::with_columns(schedule, ColumnMap::default())
    }

    pub fn with_columns(schedule: RateSchedule, columns: ColumnMap) -> Self {
        Self {
            classification: TouClassification::new(schedule, columns),
        }
    }

    pub fn build<I>(&self, pairs: I) -> Result<ReportLayout, PipelineError>
    where
        I: IntoIterator<Item = Result<ReadingPair, PipelineError>>,
    {
        let mut layout = ReportLayout {
            columns: self.classification.columns().clone(),
            header: BTreeMap::new(),
            merges: Vec::new(),
            rows: Vec::new(),
            boxes: Vec::new(),
            data_first_row: DATA_FIRST_ROW,
        };

        write_header_skeleton(&mut layout);

        for pair in pairs {
            let pair = pair?;
            layout.rows.push(self.classification.apply(&pair));
        }
        tracing::debug!(rows = layout.rows.len(), "data rows appended");

        backfill_totals(&mut layout);
        draw_boxes(&mut layout);

        Ok(layout)
    }
}

fn put(layout: &mut ReportLayout, row: RowNum, col: ColNum, value: CellValue, centered: bool) {
    layout.header.insert(
        (row, col),
        HeaderCell {
            value,
            bold: true,
            centered,
        },
    );
}

fn put_merged(layout: &mut ReportLayout, range: CellRange, value: CellValue) {
    put(layout, range.first_row, range.first_col, value, true);
    layout.merges.push(range);
}

fn write_header_skeleton(layout: &mut ReportLayout) {
    let text = |s: &str| CellValue::Text(s.to_string());

    put_merged(
        layout,
        CellRange::new(TITLE_ROW, TIMESTAMP_COL, BUCKET_ROW, TIMESTAMP_COL),
        text("Interval"),
    );
    put(layout, TOTAL_ROW, TIMESTAMP_COL, text("Total kWh"), false);
    put(layout, NET_ROW, TIMESTAMP_COL, text("Net kWh"), false);
    put(layout, LABEL_ROW, TIMESTAMP_COL, text("Timestamp"), true);

    let blocks = layout.columns.blocks().to_vec();
    for block in blocks {
        put_merged(
            layout,
            CellRange::new(TITLE_ROW, block.first_col, TITLE_ROW, block.last_value_col()),
            text(block.plan.title()),
        );

        for c in block.buckets() {
            put_merged(
                layout,
                CellRange::new(BUCKET_ROW, c.consumed, BUCKET_ROW, c.generated),
                text(c.bucket.label()),
            );
            put(layout, LABEL_ROW, c.consumed, text("Consumed"), true);
            put(layout, LABEL_ROW, c.generated, text("Generated"), true);
        }
    }
}

fn backfill_totals(layout: &mut ReportLayout) {
    let extent = layout.data_last_row().map(|last| (layout.data_first_row, last));

    let blocks = layout.columns.blocks().to_vec();
    for block in blocks {
        for c in block.buckets() {
            for col in [c.consumed, c.generated] {
                let total = match extent {
                    Some((first, last)) => CellValue::Formula(format!("=SUM({})", cell_range(first, col, last, col))),
                    None => CellValue::Number(0.0),
                };
                put(layout, TOTAL_ROW, col, total, false);
            }

            let net = format!(
                "={}-{}",
                row_col_to_cell(TOTAL_ROW, c.consumed),
                row_col_to_cell(TOTAL_ROW, c.generated)
            );
            put_merged(
                layout,
                CellRange::new(NET_ROW, c.consumed, NET_ROW, c.generated),
                CellValue::Formula(net),
            );
        }
    }
}

fn draw_boxes(layout: &mut ReportLayout) {
    let data_last = layout.last_row();

    let mut spans = vec![(TIMESTAMP_COL, TIMESTAMP_COL)];
    spans.extend(layout.columns.blocks().iter().map(|b| (b.first_col, b.last_value_col())));

    for (first_col, last_col) in spans {
        layout.boxes.push(CellRange::new(TITLE_ROW, first_col, NET_ROW, last_col));
        layout.boxes.push(CellRange::new(LABEL_ROW, first_col, data_last, last_col));
    }
}
