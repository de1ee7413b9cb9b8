//! Time-of-use tariff definitions and interval classification.

use time::{macros::time, PrimitiveDateTime, Time, Weekday};

use crate::domain::TouBucket;

#[cfg(feature = "serde")]
time::serde::format_description!(clock_time, Time, "[hour]:[minute]:[second]");

/// Inclusive time-of-day window. A window whose `end` is earlier than its
/// `start` wraps past midnight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct ClockWindow {
    #[cfg_attr(feature = "serde", serde(with = "clock_time"))]
    pub start: Time,
    #[cfg_attr(feature = "serde", serde(with = "clock_time"))]
    pub end: Time,
}

impl ClockWindow {
    pub const fn new(start: Time, end: Time) -> Self {
        Self { start, end }
    }

    pub fn wraps_midnight(&self) -> bool {
        self.end < self.start
    }

    pub fn contains(&self, candidate: Time) -> bool {
        if !self.wraps_midnight() {
            return self.start <= candidate && candidate <= self.end;
        }

        // Shift everything by the distance from `start` to the next midnight.
        // `start` lands on 00:00:00 and `end` stays below it, so neither bound
        // wraps a second time.
        let shift = Time::MIDNIGHT - self.start;
        let start = self.start + shift;
        let end = self.end + shift;
        let candidate = candidate + shift;

        start <= candidate && candidate <= end
    }
}

/// Peak and super-off-peak windows of the utility's TOU tariffs.
///
/// Everything outside both windows is off-peak.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct RateSchedule {
    pub peak: ClockWindow,
    /// ISO weekday numbers (Monday = 1) on which no interval is peak.
    pub peak_excluded_days: Vec<u8>,
    pub super_off_peak: ClockWindow,
}

impl Default for RateSchedule {
    fn default() -> Self {
        Self {
            peak: ClockWindow::new(time!(15:00:01), time!(19:00:00)),
            peak_excluded_days: vec![
                Weekday::Saturday.number_from_monday(),
                Weekday::Sunday.number_from_monday(),
            ],
            super_off_peak: ClockWindow::new(time!(22:00:01), time!(06:00:00)),
        }
    }
}

impl RateSchedule {
    pub fn is_peak_day(&self, weekday: Weekday) -> bool {
        !self.peak_excluded_days.contains(&weekday.number_from_monday())
    }

    /// Classify an interval into exactly one of peak, super-off-peak or
    /// off-peak.
    pub fn classify(&self, timestamp: PrimitiveDateTime) -> TouBucket {
        let time_of_day = timestamp.time();

        if self.is_peak_day(timestamp.weekday()) && self.peak.contains(time_of_day) {
            TouBucket::Peak
        } else if self.super_off_peak.contains(time_of_day) {
            TouBucket::SuperOffPeak
        } else {
            TouBucket::OffPeak
        }
    }
}

/// Billing schedules a report compares side by side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BillingPlan {
    /// Flat rate, every interval in one bucket.
    NonTou,
    /// Peak and off-peak only; super-off-peak intervals bill as off-peak.
    OffPeak,
    /// Peak, off-peak and super-off-peak.
    SuperOffPeak,
}

impl BillingPlan {
    pub const ALL: [BillingPlan; 3] = [Self::NonTou, Self::OffPeak, Self::SuperOffPeak];

    pub fn title(self) -> &'static str {
        match self {
            Self::NonTou => "Non-TOU",
            Self::OffPeak => "TOU Off-Peak",
            Self::SuperOffPeak => "TOU Super-Off-Peak",
        }
    }

    pub fn buckets(self) -> &'static [TouBucket] {
        match self {
            Self::NonTou => &[TouBucket::NonTou],
            Self::OffPeak => &[TouBucket::Peak, TouBucket::OffPeak],
            Self::SuperOffPeak => &[TouBucket::Peak, TouBucket::OffPeak, TouBucket::SuperOffPeak],
        }
    }

    /// Bucket this plan bills a classified interval under.
    pub fn bucket_for(self, classified: TouBucket) -> TouBucket {
        match (self, classified) {
            (Self::NonTou, _) => TouBucket::NonTou,
            (Self::OffPeak, TouBucket::SuperOffPeak) => TouBucket::OffPeak,
            (_, bucket) => bucket,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::{macros::datetime, Duration};

    // 2025-06-16 is a Monday, 2025-06-14 a Saturday and 2025-06-15 a Sunday.
    const MONDAY: PrimitiveDateTime = datetime!(2025-06-16 00:00:00);

    fn at(day: PrimitiveDateTime, t: Time) -> PrimitiveDateTime {
        day.replace_time(t)
    }

    #[test]
    fn peak_boundaries_are_inclusive() {
        let s = RateSchedule::default();

        assert_eq!(s.classify(at(MONDAY, time!(15:00:00))), TouBucket::OffPeak);
        assert_eq!(s.classify(at(MONDAY, time!(15:00:01))), TouBucket::Peak);
        assert_eq!(s.classify(at(MONDAY, time!(19:00:00))), TouBucket::Peak);
        assert_eq!(s.classify(at(MONDAY, time!(19:00:01))), TouBucket::OffPeak);
    }

    #[test]
    fn super_off_peak_boundaries_wrap_midnight() {
        let s = RateSchedule::default();

        assert_eq!(s.classify(at(MONDAY, time!(22:00:00))), TouBucket::OffPeak);
        assert_eq!(s.classify(at(MONDAY, time!(22:00:01))), TouBucket::SuperOffPeak);
        assert_eq!(s.classify(at(MONDAY, time!(23:59:59))), TouBucket::SuperOffPeak);
        assert_eq!(s.classify(at(MONDAY, time!(00:00:00))), TouBucket::SuperOffPeak);
        assert_eq!(s.classify(at(MONDAY, time!(06:00:00))), TouBucket::SuperOffPeak);
        assert_eq!(s.classify(at(MONDAY, time!(06:00:01))), TouBucket::OffPeak);
    }

    #[test]
    fn weekends_are_never_peak() {
        let s = RateSchedule::default();
        let saturday = datetime!(2025-06-14 16:00:00);
        let sunday = datetime!(2025-06-15 16:00:00);

        assert_eq!(s.classify(saturday), TouBucket::OffPeak);
        assert_eq!(s.classify(sunday), TouBucket::OffPeak);
        assert_eq!(s.classify(datetime!(2025-06-15 23:00:00)), TouBucket::SuperOffPeak);
    }

    #[test]
    fn classification_never_yields_non_tou_over_a_week() {
        let s = RateSchedule::default();
        let mut ts = datetime!(2025-06-14 00:00:00);
        let end = ts + Duration::days(7);

        while ts < end {
            assert_ne!(s.classify(ts), TouBucket::NonTou, "{ts}");
            ts += Duration::seconds(30);
        }
    }

    #[test]
    fn non_wrapping_window_contains_only_its_span() {
        let w = ClockWindow::new(time!(09:00:00), time!(10:00:00));

        assert!(!w.wraps_midnight());
        assert!(w.contains(time!(09:00:00)));
        assert!(w.contains(time!(10:00:00)));
        assert!(!w.contains(time!(10:00:01)));
        assert!(!w.contains(time!(08:59:59)));
    }

    #[test]
    fn custom_schedule_changes_classification() {
        let s = RateSchedule {
            peak: ClockWindow::new(time!(14:00:00), time!(18:59:59)),
            peak_excluded_days: vec![7],
            super_off_peak: ClockWindow::new(time!(23:00:00), time!(06:59:59)),
        };

        assert_eq!(s.classify(datetime!(2025-06-14 14:00:00)), TouBucket::Peak);
        assert_eq!(s.classify(datetime!(2025-06-15 14:00:00)), TouBucket::OffPeak);
        assert_eq!(s.classify(datetime!(2025-06-16 22:30:00)), TouBucket::OffPeak);
        assert_eq!(s.classify(datetime!(2025-06-16 06:30:00)), TouBucket::SuperOffPeak);
    }

    #[test]
    fn plans_fold_super_off_peak_only_where_it_has_no_column() {
        assert_eq!(BillingPlan::NonTou.bucket_for(TouBucket::Peak), TouBucket::NonTou);
        assert_eq!(BillingPlan::OffPeak.bucket_for(TouBucket::SuperOffPeak), TouBucket::OffPeak);
        assert_eq!(BillingPlan::OffPeak.bucket_for(TouBucket::Peak), TouBucket::Peak);
        assert_eq!(
            BillingPlan::SuperOffPeak.bucket_for(TouBucket::SuperOffPeak),
            TouBucket::SuperOffPeak
        );

        for plan in BillingPlan::ALL {
            for classified in [TouBucket::Peak, TouBucket::OffPeak, TouBucket::SuperOffPeak] {
                assert!(plan.buckets().contains(&plan.bucket_for(classified)));
            }
        }
    }
}
