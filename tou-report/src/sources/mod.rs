pub mod interval_usage_csv;
pub mod meter_label;

pub use interval_usage_csv::{IntervalUsageCsvSource, PairedRows};
pub use meter_label::{extract_meter_id, ReadingKind};
