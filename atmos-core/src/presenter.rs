//! Transcript view-model.
//!
//! The transcript is an append-only list of entries owned by the
//! [`Presenter`]. HTML and terminal output are projections of that list and
//! never feed back into it.

use std::{
    fmt,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
    time::Duration,
};

use rust_decimal::{Decimal, RoundingStrategy};
use tokio::{runtime::Handle, task::JoinHandle};
use tracing::debug;

use crate::{
    config::DEFAULT_ERROR_DISMISS_SECS,
    markdown,
    model::{ChatMessage, ForecastResponse, Sender},
};

pub const WELCOME_MESSAGE: &str = "Welcome to Atmos - AI Powered weather forecaster.<br>Please select a date (available until 18 February 2026) to get a weather forecast.";
pub const HINT_TEXT: &str = "Click to see detailed analysis";
pub const ICON_FILE: &str = "cloudy-day-3.svg";

/// How the view should bring the newest entry into sight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scroll {
    /// Jump straight to the bottom.
    Instant,
    /// Smooth scroll on the next paint.
    Smooth,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Metric {
    pub label: &'static str,
    pub unit: &'static str,
    pub value: Option<f64>,
}

impl Metric {
    /// Value with exactly two decimals and its unit, or `N/A` when absent.
    pub fn display_value(&self) -> String {
        match self.value {
            Some(v) => format!("{}{}", two_decimals(v), self.unit),
            None => "N/A".to_string(),
        }
    }
}

/// Two-decimal rendering of the exact binary value, ties rounded away from zero.
fn two_decimals(v: f64) -> String {
    // -0.0 prints as 0.00
    let v = if v == 0.0 { 0.0 } else { v };

    match Decimal::from_f64_retain(v) {
        Some(d) => {
            let mut rounded = d.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
            rounded.rescale(2);
            rounded.to_string()
        }
        None => format!("{v:.2}"),
    }
}

/// Collapsible summary of one forecast.
#[derive(Debug, Clone, PartialEq)]
pub struct WeatherCard {
    pub metrics: [Metric; 4],
    pub forecast: String,
    pub forecast_html: String,
    expanded: bool,
}

impl WeatherCard {
    pub fn from_response(response: &ForecastResponse) -> Self {
        let data = &response.data_used;
        let metric = |label, unit, value| Metric { label, unit, value };

        Self {
            metrics: [
                metric("Temperature", "°C", data.temperature_2m),
                metric("Humidity", "%", data.relative_humidity_2m),
                metric("Precipitation", "mm", data.precipitation),
                metric("Wind Speed", "km/h", data.wind_speed_10m),
            ],
            forecast: response.forecast.clone(),
            forecast_html: markdown::to_html(&response.forecast),
            expanded: false,
        }
    }

    /// Flip the detail panel; returns whether it is now expanded.
    pub fn toggle(&mut self) -> bool {
        self.expanded = !self.expanded;
        self.expanded
    }

    pub fn is_expanded(&self) -> bool {
        self.expanded
    }

    pub fn hint_visible(&self) -> bool {
        !self.expanded
    }

    pub fn detail_visible(&self) -> bool {
        self.expanded
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Entry {
    Message { message: ChatMessage, html: String },
    Card(WeatherCard),
}

impl Entry {
    fn message(sender: Sender, text: &str) -> Self {
        let html = match sender {
            Sender::Bot => markdown::to_html(text),
            Sender::User => markdown::escape_text(text),
        };
        Entry::Message { message: ChatMessage { sender, content: text.to_string() }, html }
    }

    pub fn sender(&self) -> Sender {
        match self {
            Entry::Message { message, .. } => message.sender,
            Entry::Card(_) => Sender::Bot,
        }
    }

    pub fn as_card(&self) -> Option<&WeatherCard> {
        match self {
            Entry::Card(card) => Some(card),
            Entry::Message { .. } => None,
        }
    }
}

impl fmt::Display for Entry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Entry::Message { message, .. } => match message.sender {
                Sender::User => write!(f, "You: {}", message.content),
                Sender::Bot => write!(f, "Atmos: {}", message.content.replace("<br>", "\n")),
            },
            Entry::Card(card) => {
                writeln!(f, "Atmos:")?;
                for metric in &card.metrics {
                    writeln!(f, "  {:<14} {}", metric.label, metric.display_value())?;
                }
                if card.detail_visible() {
                    write!(f, "\n{}", card.forecast.trim_end())
                } else {
                    write!(f, "  ({HINT_TEXT})")
                }
            }
        }
    }
}

#[derive(Debug, Default)]
pub struct Transcript {
    entries: Vec<Entry>,
    scroll: Option<Scroll>,
}

impl Transcript {
    fn push(&mut self, entry: Entry, scroll: Scroll) -> usize {
        self.entries.push(entry);
        self.scroll = Some(scroll);
        self.entries.len() - 1
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn cards(&self) -> impl Iterator<Item = &WeatherCard> {
        self.entries.iter().filter_map(Entry::as_card)
    }

    /// Pending scroll request, consumed by whoever paints the view.
    pub fn take_scroll(&mut self) -> Option<Scroll> {
        self.scroll.take()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ErrorBanner {
    #[default]
    Hidden,
    Visible(String),
}

/// The single error banner and its dismiss timer.
///
/// Showing a new error or clearing the slot cancels the running timer, so a
/// stale timer never hides a newer message. Without a tokio runtime there is
/// no timer and the banner stays up until cleared.
#[derive(Debug)]
pub struct ErrorSlot {
    banner: Arc<Mutex<ErrorBanner>>,
    timer: Option<JoinHandle<()>>,
    dismiss_after: Duration,
}

impl ErrorSlot {
    pub fn new(dismiss_after: Duration) -> Self {
        Self { banner: Arc::default(), timer: None, dismiss_after }
    }

    pub fn show(&mut self, message: impl Into<String>) {
        self.cancel_timer();
        *lock(&self.banner) = ErrorBanner::Visible(message.into());

        let Ok(runtime) = Handle::try_current() else {
            debug!("no runtime, error banner will not auto-dismiss");
            return;
        };

        let banner = Arc::clone(&self.banner);
        let dismiss_after = self.dismiss_after;
        self.timer = Some(runtime.spawn(async move {
            tokio::time::sleep(dismiss_after).await;
            *lock(&banner) = ErrorBanner::Hidden;
            debug!("error banner dismissed");
        }));
    }

    pub fn clear(&mut self) {
        self.cancel_timer();
        *lock(&self.banner) = ErrorBanner::Hidden;
    }

    pub fn banner(&self) -> ErrorBanner {
        lock(&self.banner).clone()
    }

    pub fn message(&self) -> Option<String> {
        match self.banner() {
            ErrorBanner::Visible(message) => Some(message),
            ErrorBanner::Hidden => None,
        }
    }

    pub fn is_visible(&self) -> bool {
        self.message().is_some()
    }

    fn cancel_timer(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.abort();
        }
    }
}

impl Default for ErrorSlot {
    fn default() -> Self {
        Self::new(Duration::from_secs(DEFAULT_ERROR_DISMISS_SECS))
    }
}

impl Drop for ErrorSlot {
    fn drop(&mut self) {
        self.cancel_timer();
    }
}

fn lock(banner: &Mutex<ErrorBanner>) -> MutexGuard<'_, ErrorBanner> {
    banner.lock().unwrap_or_else(PoisonError::into_inner)
}

#[derive(Debug, Default)]
pub struct Presenter {
    transcript: Transcript,
    error: ErrorSlot,
}

impl Presenter {
    /// A presenter whose transcript starts with the welcome message.
    pub fn new(error_dismiss_after: Duration) -> Self {
        let mut presenter = Self::empty(error_dismiss_after);
        presenter.append_message(Sender::Bot, WELCOME_MESSAGE);
        presenter
    }

    pub fn empty(error_dismiss_after: Duration) -> Self {
        Self { transcript: Transcript::default(), error: ErrorSlot::new(error_dismiss_after) }
    }

    /// Append a chat message. Bot text is rendered as markdown, user text stays literal.
    pub fn append_message(&mut self, sender: Sender, text: &str) -> usize {
        self.transcript.push(Entry::message(sender, text), Scroll::Instant)
    }

    /// Append a collapsed weather card for `response`.
    pub fn build_card(&mut self, response: &ForecastResponse) -> usize {
        let card = WeatherCard::from_response(response);
        self.transcript.push(Entry::Card(card), Scroll::Smooth)
    }

    /// Toggle the card at `index`; `None` if that entry is not a card.
    pub fn toggle_card(&mut self, index: usize) -> Option<bool> {
        match self.transcript.entries.get_mut(index)? {
            Entry::Card(card) => Some(card.toggle()),
            Entry::Message { .. } => None,
        }
    }

    pub fn show_error(&mut self, message: impl Into<String>) {
        self.error.show(message);
    }

    pub fn clear_error(&mut self) {
        self.error.clear();
    }

    pub fn error_slot(&self) -> &ErrorSlot {
        &self.error
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    pub fn transcript_mut(&mut self) -> &mut Transcript {
        &mut self.transcript
    }

    /// Self-contained HTML page showing the transcript and the error slot.
    pub fn render_html(&self) -> String {
        let mut out = String::from(PAGE_HEAD);

        out.push_str("<div id=\"chatContainer\" class=\"chat-container\">\n");
        for entry in self.transcript.entries() {
            render_entry(&mut out, entry);
        }
        out.push_str("</div>\n");

        match self.error.banner() {
            ErrorBanner::Visible(message) => out.push_str(&format!(
                "<div id=\"error\" class=\"error visible\">{}</div>\n",
                markdown::escape_text(&message)
            )),
            ErrorBanner::Hidden => out.push_str("<div id=\"error\" class=\"error\"></div>\n"),
        }

        out.push_str("</body>\n</html>\n");
        out
    }
}

fn render_entry(out: &mut String, entry: &Entry) {
    match entry {
        Entry::Message { message, html } => {
            out.push_str(&format!(
                "<div class=\"chat-message {}\">{}</div>\n",
                message.sender,
                html.trim_end()
            ));
        }
        Entry::Card(card) => {
            out.push_str("<div class=\"chat-message bot\">\n<div class=\"weather-card\">\n");
            out.push_str(&format!(
                "<div class=\"weather-icon\"><img src=\"{}\" alt=\"Weather Icon\" width=\"64\" height=\"64\"></div>\n",
                markdown::escape_attr(ICON_FILE)
            ));

            out.push_str("<div class=\"weather-grid\">\n");
            for metric in &card.metrics {
                out.push_str(&format!(
                    "<div class=\"weather-item\"><span class=\"label\">{}</span><span class=\"value\">{}</span></div>\n",
                    metric.label,
                    metric.display_value()
                ));
            }
            out.push_str("</div>\n");

            let hint_display = if card.hint_visible() { "block" } else { "none" };
            out.push_str(&format!("<div class=\"hint\" style=\"display: {hint_display}\">{HINT_TEXT}</div>\n"));

            let visible = if card.detail_visible() { " visible" } else { "" };
            out.push_str(&format!(
                "<div class=\"weather-response{visible}\">{}</div>\n",
                card.forecast_html.trim_end()
            ));
            out.push_str("</div>\n</div>\n");
        }
    }
}

const PAGE_HEAD: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>Atmos</title>
<style>
.chat-message { margin: 8px 0; padding: 8px 12px; border-radius: 8px; }
.chat-message.user { background: #e3f2fd; text-align: right; white-space: pre-wrap; }
.chat-message.bot { background: #f5f5f5; }
.weather-icon { text-align: center; margin-bottom: 20px; }
.weather-grid { display: grid; grid-template-columns: 1fr 1fr; gap: 8px; }
.weather-item .label { display: block; color: #666; }
.hint { text-align: center; color: #666; font-size: 0.9rem; margin-top: 10px; }
.weather-response { display: none; }
.weather-response.visible { display: block; }
.error { display: none; color: #b00020; }
.error.visible { display: block; }
</style>
</head>
<body>
"#;
