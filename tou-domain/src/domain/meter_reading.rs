use time::PrimitiveDateTime;

/// One interval row of a utility usage export.
///
/// The timestamp is local wall-clock time as printed by the utility; no
/// offset is attached because the tariff windows are defined in the same
/// local time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MeterReading {
    pub timestamp: PrimitiveDateTime,
    pub meter_id: u64,
    pub kilowatt_hours: f64,
}

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum PairMismatch {
    #[error("meter id {consumption} does not match generation meter id {generation}")]
    MeterId { consumption: u64, generation: u64 },
    #[error("timestamp {consumption} does not match generation timestamp {generation}")]
    Timestamp {
        consumption: PrimitiveDateTime,
        generation: PrimitiveDateTime,
    },
}

/// A consumption reading and the generation reading of the same interval.
///
/// Both readings always share meter id and timestamp.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReadingPair {
    consumption: MeterReading,
    generation: MeterReading,
}

impl ReadingPair {
    pub fn try_new(consumption: MeterReading, generation: MeterReading) -> Result<Self, PairMismatch> {
        if consumption.meter_id != generation.meter_id {
            return Err(PairMismatch::MeterId {
                consumption: consumption.meter_id,
                generation: generation.meter_id,
            });
        }
        if consumption.timestamp != generation.timestamp {
            return Err(PairMismatch::Timestamp {
                consumption: consumption.timestamp,
                generation: generation.timestamp,
            });
        }

        Ok(Self {
            consumption,
            generation,
        })
    }

    pub fn timestamp(&self) -> PrimitiveDateTime {
        self.consumption.timestamp
    }

    pub fn meter_id(&self) -> u64 {
        self.consumption.meter_id
    }

    pub fn consumed_kwh(&self) -> f64 {
        self.consumption.kilowatt_hours
    }

    pub fn generated_kwh(&self) -> f64 {
        self.generation.kilowatt_hours
    }
}
