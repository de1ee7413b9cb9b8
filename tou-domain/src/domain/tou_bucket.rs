use std::fmt;

/// Billing bucket an interval is counted under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TouBucket {
    NonTou,
    Peak,
    OffPeak,
    SuperOffPeak,
}

impl TouBucket {
    pub fn label(self) -> &'static str {
        match self {
            Self::NonTou => "All Hours",
            Self::Peak => "Peak",
            Self::OffPeak => "Off-Peak",
            Self::SuperOffPeak => "Super-Off-Peak",
        }
    }
}

impl fmt::Display for TouBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
