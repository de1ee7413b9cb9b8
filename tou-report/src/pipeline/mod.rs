use std::path::PathBuf;

use tou_domain::ReadingPair;

use crate::report::{ReportBuilder, ReportLayout};

#[derive(thiserror::Error, Debug)]
pub enum PipelineError {
    #[error("header has no '{column}' column")]
    MissingColumn { column: String },
    #[error("lines {lines:?}: cannot extract a meter id from label '{label}'")]
    MalformedMeterLabel { lines: [u64; 2], label: String },
    #[error("lines {lines:?}: consumption and generation rows do not pair up: {reason}")]
    MismatchedPair { lines: [u64; 2], reason: tou_domain::PairMismatch },
    #[error("line {line}: consumption row has no generation row")]
    TruncatedInput { line: u64 },
    #[error("line {line}: invalid timestamp '{value}': {reason}")]
    InvalidTimestamp { line: u64, value: String, reason: String },
    #[error("line {line}: invalid kWh value '{value}': {reason}")]
    InvalidQuantity { line: u64, value: String, reason: String },
    #[error("failed to read CSV: {0}")]
    Csv(#[from] csv::Error),
    #[error("{}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("config error: {0}")]
    Config(String),
    #[error("failed to render workbook: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),
    #[error("sink error: {0}")]
    Sink(String),
}

pub type ReadingPairs = Box<dyn Iterator<Item = Result<ReadingPair, PipelineError>>>;

/// Produces validated reading pairs, in input order.
pub trait Source {
    fn pairs(&self) -> Result<ReadingPairs, PipelineError>;
}

/// Persists a finished layout. Nothing may be written before `write` is
/// called with the complete report.
pub trait Sink {
    fn write(&self, layout: &ReportLayout) -> Result<(), PipelineError>;
}

pub struct Pipeline<S, K> {
    pub source: S,
    pub builder: ReportBuilder,
    pub sink: K,
}

impl<S, K> Pipeline<S, K>
where
    S: Source,
    K: Sink,
{
    /// Run read → validate → classify → lay out → write. Any error aborts
    /// before the sink is touched.
    pub fn run(self) -> Result<ReportLayout, PipelineError> {
        let pairs = self.source.pairs()?;
        let layout = self.builder.build(pairs)?;

        tracing::info!(rows = layout.rows().len(), "report layout complete");

        self.sink.write(&layout)?;
        Ok(layout)
    }
}
