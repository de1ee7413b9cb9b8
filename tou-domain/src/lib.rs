pub mod domain;
pub mod tariff;

pub use domain::{MeterReading, PairMismatch, ReadingPair, TouBucket};
pub use tariff::{BillingPlan, ClockWindow, RateSchedule};
