use serde::Deserialize;
use std::{fs, path::Path};
use tou_domain::RateSchedule;

use crate::pipeline::PipelineError;

/// Column names looked up in the export's header row.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct InputConfig {
    pub energy_column: String,
    /// Falls back to the first column when the header has no such name.
    pub timestamp_column: String,
    /// Falls back to the second column when the header has no such name.
    pub meter_column: String,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            energy_column: "kWh".to_string(),
            timestamp_column: "Time".to_string(),
            meter_column: "Meter".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    pub input: InputConfig,
    pub rates: RateSchedule,
}

impl ReportConfig {
    /// Load from a TOML file, or use the built-in tariff when no path is given.
    pub fn load(path: Option<&Path>) -> Result<Self, PipelineError> {
        let Some(path) = path else {
            return Ok(Self::default());
        };

        let contents = fs::read_to_string(path).map_err(|source| PipelineError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let cfg = Self::from_toml(&contents)?;
        tracing::debug!(path = %path.display(), "loaded report config");
        Ok(cfg)
    }

    pub fn from_toml(contents: &str) -> Result<Self, PipelineError> {
        let cfg: Self = toml::from_str(contents).map_err(|e| PipelineError::Config(e.to_string()))?;

        if let Some(day) = cfg.rates.peak_excluded_days.iter().find(|d| !(1..=7).contains(*d)) {
            return Err(PipelineError::Config(format!(
                "rates.peak_excluded_days: {day} is not an ISO weekday (Monday = 1 through Sunday = 7)"
            )));
        }
        Ok(cfg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::time;

    #[test]
    fn empty_config_uses_defaults() {
        let cfg = ReportConfig::from_toml("").unwrap();

        assert_eq!(cfg.input.energy_column, "kWh");
        assert_eq!(cfg.rates, RateSchedule::default());
    }

    #[test]
    fn rate_windows_parse_from_clock_strings() {
        let cfg = ReportConfig::from_toml(
            r#"
            [input]
            energy_column = "Usage (kWh)"

            [rates]
            peak_excluded_days = [7]

            [rates.peak]
            start = "14:00:00"
            end = "18:59:59"
            "#,
        )
        .unwrap();

        assert_eq!(cfg.input.energy_column, "Usage (kWh)");
        assert_eq!(cfg.input.meter_column, "Meter");
        assert_eq!(cfg.rates.peak.start, time!(14:00:00));
        assert_eq!(cfg.rates.peak.end, time!(18:59:59));
        assert_eq!(cfg.rates.peak_excluded_days, vec![7]);
        assert_eq!(cfg.rates.super_off_peak, RateSchedule::default().super_off_peak);
    }

    #[test]
    fn malformed_clock_time_is_a_config_error() {
        let res = ReportConfig::from_toml(
            r#"
            [rates.peak]
            start = "3pm"
            end = "19:00:00"
            "#,
        );

        assert!(matches!(res, Err(PipelineError::Config(_))));
    }

    #[test]
    fn weekday_numbers_outside_iso_range_are_rejected() {
        for days in ["[0, 6]", "[6, 8]"] {
            let res = ReportConfig::from_toml(&format!("[rates]\npeak_excluded_days = {days}\n"));
            assert!(matches!(res, Err(PipelineError::Config(msg)) if msg.contains("peak_excluded_days")), "{days}");
        }

        let cfg = ReportConfig::from_toml("[rates]\npeak_excluded_days = [6, 7]\n").unwrap();
        assert_eq!(cfg.rates.peak_excluded_days, vec![6, 7]);
    }

    #[test]
    fn missing_config_file_is_an_io_error() {
        let res = ReportConfig::load(Some(Path::new("/nonexistent/tou-report.toml")));
        assert!(matches!(res, Err(PipelineError::Io { .. })));
    }
}
