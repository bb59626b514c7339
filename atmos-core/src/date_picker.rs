use anyhow::{Result, anyhow};
use chrono::NaiveDate;

/// Format of the value submitted with the form.
pub const VALUE_FORMAT: &str = "%Y-%m-%d";

/// Human-facing format, e.g. "March 10, 2025".
pub const DISPLAY_FORMAT: &str = "%B %-d, %Y";

/// Bounds and formats of the date selector.
///
/// The picker is the only place dates are checked: the controller submits
/// whatever string it is handed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DatePicker {
    pub min: NaiveDate,
    pub max: NaiveDate,
}

impl Default for DatePicker {
    fn default() -> Self {
        Self {
            min: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap_or(NaiveDate::MIN),
            max: NaiveDate::from_ymd_opt(2026, 2, 18).unwrap_or(NaiveDate::MAX),
        }
    }
}

impl DatePicker {
    pub fn contains(&self, date: NaiveDate) -> bool {
        (self.min..=self.max).contains(&date)
    }

    /// Starting selection: `today`, pulled into range when it falls outside.
    pub fn default_date(&self, today: NaiveDate) -> NaiveDate {
        today.clamp(self.min, self.max)
    }

    /// Value string submitted for a picked date.
    pub fn value(&self, date: NaiveDate) -> String {
        date.format(VALUE_FORMAT).to_string()
    }

    pub fn display(&self, date: NaiveDate) -> String {
        date.format(DISPLAY_FORMAT).to_string()
    }

    /// Accept a date typed outside the widget (e.g. a CLI flag) only if the
    /// widget itself could have produced it.
    pub fn pick(&self, input: &str) -> Result<String> {
        let date = NaiveDate::parse_from_str(input.trim(), VALUE_FORMAT)
            .map_err(|_| anyhow!("Invalid date '{input}'. Use YYYY-MM-DD."))?;

        if !self.contains(date) {
            return Err(anyhow!(
                "Date {} is outside the available range {} .. {}.",
                self.value(date),
                self.value(self.min),
                self.value(self.max),
            ));
        }

        Ok(self.value(date))
    }
}
