pub mod meter_reading;
pub mod tou_bucket;

pub use meter_reading::{MeterReading, PairMismatch, ReadingPair};
pub use tou_bucket::TouBucket;
