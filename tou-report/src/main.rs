use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tou_report::{
    config::ReportConfig,
    observability,
    pipeline::Pipeline,
    report::ReportBuilder,
    sinks::XlsxReportSink,
    sources::IntervalUsageCsvSource,
};

#[derive(Parser)]
#[command(name = "tou-report")]
#[command(about = "Build a time-of-use spreadsheet from a utility interval usage export", long_about = None)]
struct Cli {
    /// Interval usage CSV export
    #[arg(short, long)]
    input: PathBuf,

    /// Spreadsheet to write (.xlsx)
    #[arg(short, long)]
    output: PathBuf,

    /// TOML file with column names and rate windows; built-in tariff if omitted
    #[arg(short, long)]
    config: Option<PathBuf>,
}

fn main() -> Result<()> {
    observability::init_tracing();

    let cli = Cli::parse();
    let cfg = ReportConfig::load(cli.config.as_deref()).context("failed to load report config")?;

    let pipeline = Pipeline {
        source: IntervalUsageCsvSource::new(&cli.input, cfg.input),
        builder: ReportBuilder::new(cfg.rates),
        sink: XlsxReportSink::new(&cli.output),
    };

    let layout = pipeline
        .run()
        .inspect_err(|e| tracing::error!(error = %e, "report aborted, no output written"))
        .with_context(|| format!("failed to build report from {}", cli.input.display()))?;

    for (plan, bucket, consumed, generated) in layout.bucket_totals() {
        tracing::info!(
            plan = plan.title(),
            bucket = %bucket,
            consumed_kwh = consumed,
            generated_kwh = generated,
            "bucket totals"
        );
    }

    Ok(())
}
