use tou_domain::{RateSchedule, ReadingPair, TouBucket};

use crate::report::{columns::ColumnMap, ReportRow};

/// Spread a pair's readings over the plan blocks.
///
/// Every plan gets the raw values in the columns of the bucket it bills the
/// interval under and explicit zeros in its other value columns, so each
/// block sums cleanly over a contiguous range. Spacers stay blank.
pub fn fill_row(pair: &ReadingPair, classified: TouBucket, columns: &ColumnMap) -> ReportRow {
    let mut values = vec![None; usize::from(columns.column_count()) - 1];

    for block in columns.blocks() {
        let billed = block.plan.bucket_for(classified);
        for c in block.buckets() {
            let (consumed, generated) = if c.bucket == billed {
                (pair.consumed_kwh(), pair.generated_kwh())
            } else {
                (0.0, 0.0)
            };
            values[usize::from(c.consumed) - 1] = Some(consumed);
            values[usize::from(c.generated) - 1] = Some(generated);
        }
    }

    ReportRow {
        timestamp: pair.timestamp(),
        values,
    }
}

/// Classifies each pair against the rate schedule and lays it out as a row.
#[derive(Debug, Clone)]
pub struct TouClassification {
    schedule: RateSchedule,
    columns: ColumnMap,
}

impl TouClassification {
    pub fn new(schedule: RateSchedule, columns: ColumnMap) -> Self {
        Self { schedule, columns }
    }

    pub fn columns(&self) -> &ColumnMap {
        &self.columns
    }

    pub fn apply(&self, pair: &ReadingPair) -> ReportRow {
        let classified = self.schedule.classify(pair.timestamp());
        tracing::trace!(
            timestamp = %pair.timestamp(),
            meter_id = pair.meter_id(),
            bucket = %classified,
            "classified interval"
        );
        fill_row(pair, classified, &self.columns)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::{macros::datetime, PrimitiveDateTime};
    use tou_domain::{BillingPlan, MeterReading};

    fn pair(timestamp: PrimitiveDateTime, consumed: f64, generated: f64) -> ReadingPair {
        ReadingPair::try_new(
            MeterReading {
                timestamp,
                meter_id: 7,
                kilowatt_hours: consumed,
            },
            MeterReading {
                timestamp,
                meter_id: 7,
                kilowatt_hours: generated,
            },
        )
        .unwrap()
    }

    fn block_sum(row: &ReportRow, columns: &ColumnMap, plan: BillingPlan) -> f64 {
        let block = columns.blocks().iter().find(|b| b.plan == plan).unwrap();
        (block.first_col..=block.last_value_col()).filter_map(|c| row.value(c)).sum()
    }

    #[test]
    #[rustfmt::skip]
    fn weekday_peak_row_matches_expected_columns() {
        let columns = ColumnMap::default();
        let t = TouClassification::new(RateSchedule::default(), columns.clone());
        let row = t.apply(&pair(datetime!(2025-06-16 16:00:00), 1.5, 0.0));

        let z = Some(0.0);
        assert_eq!(
            row.values,
            vec![
                Some(1.5), z, None, // Non-TOU
                Some(1.5), z, z, z, None, // Off-Peak schedule
                Some(1.5), z, z, z, z, z, None, // Super-Off-Peak schedule
            ]
        );
    }

    #[test]
    fn super_off_peak_folds_into_off_peak_for_two_bucket_plan() {
        let columns = ColumnMap::default();
        let row = fill_row(&pair(datetime!(2025-06-15 23:00:00), 2.0, 0.5), TouBucket::SuperOffPeak, &columns);

        assert_eq!(row.value(4), Some(0.0));
        assert_eq!(row.value(6), Some(2.0));
        assert_eq!(row.value(7), Some(0.5));
        assert_eq!(row.value(13), Some(2.0));
        assert_eq!(row.value(14), Some(0.5));
        assert_eq!(row.value(11), Some(0.0));
    }

    #[test]
    fn every_block_sums_to_consumed_plus_generated() {
        let columns = ColumnMap::default();
        for bucket in [TouBucket::Peak, TouBucket::OffPeak, TouBucket::SuperOffPeak] {
            let row = fill_row(&pair(datetime!(2025-06-16 12:00:00), 1.25, 0.75), bucket, &columns);
            for plan in BillingPlan::ALL {
                assert_eq!(block_sum(&row, &columns, plan), 2.0, "{plan:?} {bucket:?}");
            }
        }
    }
}
