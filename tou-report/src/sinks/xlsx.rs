use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
};

use rust_xlsxwriter::{ColNum, ExcelDateTime, Format, FormatAlign, FormatBorder, RowNum, Workbook, Worksheet};
use time::PrimitiveDateTime;

use crate::{
    pipeline::{PipelineError, Sink},
    report::{columns::TIMESTAMP_COL, Borders, CellValue, HeaderCell, ReportLayout},
};

pub const SHEET_NAME: &str = "Usage";

const KWH_FORMAT: &str = "0.000";
const TIMESTAMP_FORMAT: &str = "mm/dd/yyyy hh:mm AM/PM";
const TIMESTAMP_WIDTH: f64 = 21.0;

/// Writes the report as a single-sheet `.xlsx` workbook.
///
/// The workbook is rendered in memory and written to `<output>.partial`
/// first, then renamed over the target.
pub struct XlsxReportSink {
    path: PathBuf,
}

impl XlsxReportSink {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }
}

impl Sink for XlsxReportSink {
    fn write(&self, layout: &ReportLayout) -> Result<(), PipelineError> {
        let bytes = render(layout)?;
        persist(&self.path, &bytes)?;

        metrics::counter!("report_rows_written_total").increment(layout.rows().len() as u64);
        tracing::info!(path = %self.path.display(), rows = layout.rows().len(), "usage report written");
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum CellKind {
    Text,
    Kwh,
    Timestamp,
    Blank,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct Style {
    kind: CellKind,
    bold: bool,
    centered: bool,
    borders: Borders,
}

impl Style {
    fn plain(kind: CellKind, borders: Borders) -> Self {
        Self {
            kind,
            bold: false,
            centered: false,
            borders,
        }
    }

    fn header(cell: &HeaderCell, borders: Borders) -> Self {
        let kind = match cell.value {
            CellValue::Text(_) => CellKind::Text,
            CellValue::Number(_) | CellValue::Formula(_) => CellKind::Kwh,
        };
        Self {
            kind,
            bold: cell.bold,
            centered: cell.centered,
            borders,
        }
    }

    fn to_format(self) -> Format {
        let mut format = Format::new();
        if self.bold {
            format = format.set_bold();
        }
        if self.centered {
            format = format.set_align(FormatAlign::Center).set_align(FormatAlign::VerticalCenter);
        }
        match self.kind {
            CellKind::Kwh => format = format.set_num_format(KWH_FORMAT),
            CellKind::Timestamp => format = format.set_num_format(TIMESTAMP_FORMAT),
            CellKind::Text | CellKind::Blank => {}
        }

        let Borders {
            top,
            bottom,
            left,
            right,
        } = self.borders;
        if top {
            format = format.set_border_top(FormatBorder::Thin);
        }
        if bottom {
            format = format.set_border_bottom(FormatBorder::Thin);
        }
        if left {
            format = format.set_border_left(FormatBorder::Thin);
        }
        if right {
            format = format.set_border_right(FormatBorder::Thin);
        }
        format
    }
}

/// One `Format` per distinct style, shared by every cell using it.
#[derive(Default)]
struct Formats(HashMap<Style, Format>);

impl Formats {
    fn get(&mut self, style: Style) -> &Format {
        self.0.entry(style).or_insert_with(|| style.to_format())
    }
}

pub fn render(layout: &ReportLayout) -> Result<Vec<u8>, PipelineError> {
    let mut workbook = Workbook::new();
    let mut formats = Formats::default();

    {
        let sheet = workbook.add_worksheet();
        sheet.set_name(SHEET_NAME)?;

        for range in layout.merges() {
            let borders = layout.borders_at(range.first_row, range.first_col);
            let style = layout
                .header_cell(range.first_row, range.first_col)
                .map_or(Style::plain(CellKind::Blank, borders), |cell| Style::header(cell, borders));
            sheet.merge_range(
                range.first_row,
                range.first_col,
                range.last_row,
                range.last_col,
                "",
                formats.get(style),
            )?;
        }

        for row in 0..=layout.last_row() {
            for col in 0..layout.column_count() {
                write_cell(sheet, &mut formats, layout, row, col)?;
            }
        }

        sheet.autofit();
        sheet.set_column_width(TIMESTAMP_COL, TIMESTAMP_WIDTH)?;
    }

    Ok(workbook.save_to_buffer()?)
}

fn write_cell(
    sheet: &mut Worksheet,
    formats: &mut Formats,
    layout: &ReportLayout,
    row: RowNum,
    col: ColNum,
) -> Result<(), PipelineError> {
    let borders = layout.borders_at(row, col);

    if let Some(cell) = layout.header_cell(row, col) {
        let format = formats.get(Style::header(cell, borders));
        match &cell.value {
            CellValue::Text(s) => sheet.write_string_with_format(row, col, s, format)?,
            CellValue::Number(n) => sheet.write_number_with_format(row, col, *n, format)?,
            CellValue::Formula(f) => sheet.write_formula_with_format(row, col, f.as_str(), format)?,
        };
        return Ok(());
    }

    if let Some(data) = layout.row_at(row) {
        if col == TIMESTAMP_COL {
            let ts = excel_datetime(data.timestamp)?;
            let format = formats.get(Style::plain(CellKind::Timestamp, borders));
            sheet.write_datetime_with_format(row, col, &ts, format)?;
            return Ok(());
        }
        if let Some(v) = data.value(col) {
            let format = formats.get(Style::plain(CellKind::Kwh, borders));
            sheet.write_number_with_format(row, col, v, format)?;
            return Ok(());
        }
    }

    if !borders.is_empty() {
        sheet.write_blank(row, col, formats.get(Style::plain(CellKind::Blank, borders)))?;
    }
    Ok(())
}

fn excel_datetime(ts: PrimitiveDateTime) -> Result<ExcelDateTime, PipelineError> {
    let year = u16::try_from(ts.year())
        .map_err(|_| PipelineError::Sink(format!("timestamp {ts} is outside the spreadsheet date range")))?;

    let dt = ExcelDateTime::from_ymd(year, u8::from(ts.month()), ts.day())?.and_hms(
        u16::from(ts.hour()),
        ts.minute(),
        ts.second(),
    )?;
    Ok(dt)
}

fn partial_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".partial");
    path.with_file_name(name)
}

/// Write `bytes` next to `path` and rename into place, so `path` is either
/// untouched or holds the complete workbook.
fn persist(path: &Path, bytes: &[u8]) -> Result<(), PipelineError> {
    let partial = partial_path(path);

    let res = fs::write(&partial, bytes).and_then(|()| fs::rename(&partial, path));
    if let Err(source) = res {
        let _ = fs::remove_file(&partial);
        return Err(PipelineError::Io {
            path: path.to_path_buf(),
            source,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_file_sits_next_to_target() {
        assert_eq!(
            partial_path(Path::new("/tmp/out/usage.xlsx")),
            PathBuf::from("/tmp/out/usage.xlsx.partial")
        );
    }

    #[test]
    fn corner_style_carries_two_borders() {
        let format = Style::plain(
            CellKind::Blank,
            Borders {
                top: true,
                left: true,
                ..Borders::default()
            },
        )
        .to_format();

        assert_eq!(
            format,
            Format::new()
                .set_border_top(FormatBorder::Thin)
                .set_border_left(FormatBorder::Thin)
        );
    }

    #[test]
    fn formats_are_shared_per_style() {
        let mut formats = Formats::default();
        let style = Style::plain(CellKind::Kwh, Borders::default());

        formats.get(style);
        formats.get(style);
        formats.get(Style::plain(CellKind::Timestamp, Borders::default()));

        assert_eq!(formats.0.len(), 2);
    }

    #[test]
    fn failed_write_leaves_no_files_behind() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("missing-dir").join("usage.xlsx");

        let res = persist(&target, b"data");

        assert!(matches!(res, Err(PipelineError::Io { .. })));
        assert!(!target.exists());
        assert!(!partial_path(&target).exists());
    }
}
