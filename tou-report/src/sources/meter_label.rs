/// Which half of a consumption/generation pair a row is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadingKind {
    Consumption,
    Generation,
}

/// Marker that precedes the meter number in every label, e.g. `Meter #7`.
const ID_PREFIX: &str = " #";

impl ReadingKind {
    /// Suffixes that may follow the meter number. Generation rows are tagged
    /// with a trailing `g`, as in `Meter #7g - Solar`.
    fn terminators(self) -> &'static [&'static str] {
        match self {
            Self::Consumption => &[" - "],
            Self::Generation => &["g - ", " - "],
        }
    }
}

/// Extract the meter number from a free-text meter label.
///
/// The label must contain `" #"`; the id runs from there to the earliest
/// accepted terminator (or the end of the label) and must be an unsigned
/// integer. Anything else is rejected.
pub fn extract_meter_id(label: &str, kind: ReadingKind) -> Option<u64> {
    let (_, rest) = label.split_once(ID_PREFIX)?;

    let end = kind
        .terminators()
        .iter()
        .filter_map(|t| find_terminator(rest, t))
        .min()
        .unwrap_or(rest.len());

    let digits = rest[..end].trim();
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

fn find_terminator(rest: &str, terminator: &str) -> Option<usize> {
    rest.find(terminator).or_else(|| {
        // Trimmed exports lose the terminator's trailing blank at end of label.
        let trimmed = terminator.trim_end();
        rest.ends_with(trimmed).then(|| rest.len() - trimmed.len())
    })
}
