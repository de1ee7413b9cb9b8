use rust_xlsxwriter::ColNum;
use tou_domain::{BillingPlan, TouBucket};

pub const TIMESTAMP_COL: ColNum = 0;

/// Columns of one billing plan: a consumed/generated pair per bucket, then
/// one blank spacer column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlanBlock {
    pub plan: BillingPlan,
    pub first_col: ColNum,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BucketColumns {
    pub bucket: TouBucket,
    pub consumed: ColNum,
    pub generated: ColNum,
}

impl PlanBlock {
    pub fn last_value_col(&self) -> ColNum {
        self.first_col + 2 * self.plan.buckets().len() as ColNum - 1
    }

    pub fn spacer_col(&self) -> ColNum {
        self.last_value_col() + 1
    }

    pub fn buckets(&self) -> impl Iterator<Item = BucketColumns> + '_ {
        self.plan.buckets().iter().enumerate().map(move |(i, &bucket)| {
            let consumed = self.first_col + 2 * i as ColNum;
            BucketColumns {
                bucket,
                consumed,
                generated: consumed + 1,
            }
        })
    }
}

/// Column positions of every plan block, left to right after the timestamp.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnMap {
    blocks: Vec<PlanBlock>,
}

impl ColumnMap {
    pub fn new(plans: &[BillingPlan]) -> Self {
        let mut next = TIMESTAMP_COL + 1;
        let blocks = plans
            .iter()
            .map(|&plan| {
                let block = PlanBlock { plan, first_col: next };
                next = block.spacer_col() + 1;
                block
            })
            .collect();

        Self { blocks }
    }

    pub fn blocks(&self) -> &[PlanBlock] {
        &self.blocks
    }

    /// Total column count, timestamp and spacers included.
    pub fn column_count(&self) -> ColNum {
        self.blocks.last().map_or(TIMESTAMP_COL + 1, |b| b.spacer_col() + 1)
    }
}

impl Default for ColumnMap {
    fn default() -> Self {
        Self::new(&BillingPlan::ALL)
    }
}
