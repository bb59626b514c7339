use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::fmt;

/// Writing style the server applies to the generated forecast.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ForecastStyle {
    #[default]
    Balanced,
    Detailed,
    Casual,
    Broadcast,
}

impl ForecastStyle {
    pub fn as_str(&self) -> &'static str {
        match self {
            ForecastStyle::Balanced => "balanced",
            ForecastStyle::Detailed => "detailed",
            ForecastStyle::Casual => "casual",
            ForecastStyle::Broadcast => "broadcast",
        }
    }

    pub const fn all() -> &'static [ForecastStyle] {
        &[
            ForecastStyle::Balanced,
            ForecastStyle::Detailed,
            ForecastStyle::Casual,
            ForecastStyle::Broadcast,
        ]
    }
}

impl fmt::Display for ForecastStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for ForecastStyle {
    type Error = anyhow::Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let lower = value.to_lowercase();

        ForecastStyle::all()
            .iter()
            .copied()
            .find(|style| style.as_str() == lower)
            .ok_or_else(|| {
                anyhow::anyhow!(
                    "Unknown forecast style '{value}'. Supported styles: balanced, detailed, casual, broadcast."
                )
            })
    }
}

/// Word counts offered by the report length selector.
pub const REPORT_LENGTHS: &[u32] = &[50, 100, 200, 300];

/// Report length used when nothing else is configured.
pub const DEFAULT_REPORT_LENGTH: u32 = 200;

/// Body of `POST /api/generate_forecast`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForecastRequest {
    pub date: String,
    pub style: ForecastStyle,
    pub report_length: u32,
}

/// Successful reply of the forecast endpoint.
///
/// Every field is optional on the wire: a partial payload still renders,
/// with `N/A` in place of whatever is missing. `null` counts as missing.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ForecastResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub forecast: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub data_used: WeatherData,
}

/// The subset of weather observations the card shows.
///
/// Metrics may arrive as numbers or numeric strings; anything else is dropped.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct WeatherData {
    #[serde(default, deserialize_with = "lenient_number")]
    pub temperature_2m: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub relative_humidity_2m: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub precipitation: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub wind_speed_10m: Option<f64>,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn lenient_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    let number = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    Ok(number.filter(|n| n.is_finite()))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Sender {
    User,
    Bot,
}

impl Sender {
    pub fn as_str(&self) -> &'static str {
        match self {
            Sender::User => "user",
            Sender::Bot => "bot",
        }
    }
}

impl fmt::Display for Sender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    pub sender: Sender,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self { sender: Sender::User, content: content.into() }
    }

    pub fn bot(content: impl Into<String>) -> Self {
        Self { sender: Sender::Bot, content: content.into() }
    }
}
