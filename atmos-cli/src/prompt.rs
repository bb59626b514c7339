use anyhow::Result;
use atmos_core::{Config, DatePicker, ForecastStyle, model::REPORT_LENGTHS};
use chrono::Local;
use inquire::{Confirm, CustomType, DateSelect, InquireError, Select, Text};

/// Ask for a forecast date within the picker's bounds; returns the submit value.
pub fn date(picker: &DatePicker) -> Result<String, InquireError> {
    let today = Local::now().date_naive();

    let picked = DateSelect::new("Forecast date:")
        .with_min_date(picker.min)
        .with_max_date(picker.max)
        .with_starting_date(picker.default_date(today))
        .with_help_message(&format!(
            "Available {} to {}",
            picker.display(picker.min),
            picker.display(picker.max)
        ))
        .prompt()?;

    Ok(picker.value(picked))
}

/// Ask for a report length; returns the raw selector value.
pub fn report_length(default: u32) -> Result<String, InquireError> {
    let options: Vec<String> = REPORT_LENGTHS.iter().map(u32::to_string).collect();
    let cursor = REPORT_LENGTHS.iter().position(|&n| n == default).unwrap_or(0);

    Select::new("Report length (words):", options).with_starting_cursor(cursor).prompt()
}

pub fn show_details() -> Result<bool, InquireError> {
    Confirm::new("Show detailed analysis?").with_default(false).prompt()
}

pub fn another() -> Result<bool, InquireError> {
    Confirm::new("Another forecast?").with_default(true).prompt()
}

/// Walk the user through every config field, starting from `current`.
pub fn configure(current: &Config) -> Result<Config> {
    let base_url = Text::new("Forecast server URL:").with_default(&current.base_url).prompt()?;

    let styles = ForecastStyle::all().to_vec();
    let cursor = styles.iter().position(|s| *s == current.style).unwrap_or(0);
    let style = Select::new("Forecast style:", styles).with_starting_cursor(cursor).prompt()?;

    let default_report_length = CustomType::<u32>::new("Default report length (words):")
        .with_default(current.default_report_length)
        .with_error_message("Please enter a whole number")
        .prompt()?;

    let error_dismiss_secs = CustomType::<u64>::new("Seconds before an error is dismissed:")
        .with_default(current.error_dismiss_secs)
        .prompt()?;

    Ok(Config { base_url, style, default_report_length, error_dismiss_secs })
}

/// True when the user backed out of a prompt (Esc / Ctrl-C).
pub fn is_cancel(err: &InquireError) -> bool {
    matches!(err, InquireError::OperationCanceled | InquireError::OperationInterrupted)
}
