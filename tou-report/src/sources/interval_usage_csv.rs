use std::{fs::File, io::Read, path::PathBuf};

use csv::{StringRecord, Trim};
use time::{macros::format_description, PrimitiveDateTime};
use tou_domain::{MeterReading, ReadingPair};

use crate::{
    config::InputConfig,
    pipeline::{PipelineError, ReadingPairs, Source},
    sources::meter_label::{extract_meter_id, ReadingKind},
};

/// Interval usage export as downloaded from the utility portal.
///
/// The header row must name the energy column (`kWh` by default). Data rows
/// alternate: consumption row, then the generation row of the same meter and
/// interval. Timestamps look like `06/16/2025 04:00:00 PM`.
pub struct IntervalUsageCsvSource {
    path: PathBuf,
    input: InputConfig,
}

impl IntervalUsageCsvSource {
    pub fn new<P: Into<PathBuf>>(path: P, input: InputConfig) -> Self {
        Self {
            path: path.into(),
            input,
        }
    }
}

impl Source for IntervalUsageCsvSource {
    fn pairs(&self) -> Result<ReadingPairs, PipelineError> {
        let file = File::open(&self.path).map_err(|source| PipelineError::Io {
            path: self.path.clone(),
            source,
        })?;
        tracing::debug!(path = %self.path.display(), "reading interval usage export");

        Ok(Box::new(PairedRows::new(file, &self.input)?))
    }
}

#[derive(Debug, Clone, Copy)]
struct Columns {
    timestamp: usize,
    meter: usize,
    energy: usize,
}

impl Columns {
    fn locate(headers: &StringRecord, input: &InputConfig) -> Result<Self, PipelineError> {
        let position = |name: &str| headers.iter().position(|h| h.trim().eq_ignore_ascii_case(name.trim()));

        let energy = position(&input.energy_column).ok_or_else(|| PipelineError::MissingColumn {
            column: input.energy_column.clone(),
        })?;

        Ok(Self {
            timestamp: position(&input.timestamp_column).unwrap_or(0),
            meter: position(&input.meter_column).unwrap_or(1),
            energy,
        })
    }
}

struct Row {
    line: u64,
    record: StringRecord,
}

impl Row {
    fn field(&self, idx: usize) -> &str {
        self.record.get(idx).unwrap_or("")
    }
}

/// Lazily reads consumption/generation row pairs and validates each pair.
///
/// Stops for good after the first error.
pub struct PairedRows<R> {
    reader: csv::Reader<R>,
    columns: Columns,
    finished: bool,
}

impl<R: Read> PairedRows<R> {
    pub fn new(input: R, cfg: &InputConfig) -> Result<Self, PipelineError> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(Trim::All)
            .from_reader(input);
        let columns = Columns::locate(reader.headers()?, cfg)?;

        Ok(Self {
            reader,
            columns,
            finished: false,
        })
    }

    fn next_row(&mut self) -> Result<Option<Row>, PipelineError> {
        let mut record = StringRecord::new();
        if !self.reader.read_record(&mut record)? {
            return Ok(None);
        }
        let line = record.position().map_or(0, csv::Position::line);
        Ok(Some(Row { line, record }))
    }

    fn next_pair(&mut self) -> Result<Option<ReadingPair>, PipelineError> {
        let Some(consumption) = self.next_row()? else {
            return Ok(None);
        };
        let Some(generation) = self.next_row()? else {
            return Err(PipelineError::TruncatedInput {
                line: consumption.line,
            });
        };
        let lines = [consumption.line, generation.line];

        let consumption = self.reading(&consumption, ReadingKind::Consumption, lines)?;
        let generation = self.reading(&generation, ReadingKind::Generation, lines)?;

        let pair = ReadingPair::try_new(consumption, generation)
            .map_err(|reason| PipelineError::MismatchedPair { lines, reason })?;
        Ok(Some(pair))
    }

    fn reading(&self, row: &Row, kind: ReadingKind, lines: [u64; 2]) -> Result<MeterReading, PipelineError> {
        let label = row.field(self.columns.meter);
        let meter_id = extract_meter_id(label, kind)
            .ok_or_else(|| PipelineError::MalformedMeterLabel {
                lines,
                label: label.to_string(),
            })?;

        let ts_str = row.field(self.columns.timestamp);
        let timestamp = parse_timestamp(ts_str).map_err(|e| PipelineError::InvalidTimestamp {
            line: row.line,
            value: ts_str.to_string(),
            reason: e.to_string(),
        })?;

        let kwh_str = row.field(self.columns.energy);
        let kilowatt_hours = parse_kwh(kwh_str).map_err(|reason| PipelineError::InvalidQuantity {
            line: row.line,
            value: kwh_str.to_string(),
            reason,
        })?;

        Ok(MeterReading {
            timestamp,
            meter_id,
            kilowatt_hours,
        })
    }
}

impl<R: Read> Iterator for PairedRows<R> {
    type Item = Result<ReadingPair, PipelineError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        match self.next_pair() {
            Ok(Some(pair)) => {
                metrics::counter!("interval_usage_pairs_total").increment(1);
                Some(Ok(pair))
            }
            Ok(None) => {
                self.finished = true;
                None
            }
            Err(e) => {
                self.finished = true;
                metrics::counter!("interval_usage_rejected_total").increment(1);
                Some(Err(e))
            }
        }
    }
}

fn parse_timestamp(s: &str) -> Result<PrimitiveDateTime, time::error::Parse> {
    PrimitiveDateTime::parse(
        s,
        format_description!(
            "[month padding:none]/[day padding:none]/[year] [hour repr:12 padding:none]:[minute]:[second] [period case_sensitive:false]"
        ),
    )
}

fn parse_kwh(s: &str) -> Result<f64, String> {
    let kwh: f64 = s.parse().map_err(|e: std::num::ParseFloatError| e.to_string())?;
    if !kwh.is_finite() || kwh < 0.0 {
        return Err("kWh must be a non-negative number".to_string());
    }
    Ok(kwh)
}
