//! Core library for the `atmos` forecast chat client.
//!
//! This crate defines:
//! - Configuration handling
//! - The forecast client (wire contract of `/api/generate_forecast`)
//! - The transcript view-model and its HTML projection
//! - The form controller driving one submission at a time
//!
//! It is used by `atmos-cli`, but the view-model can be driven headlessly.

pub mod client;
pub mod config;
pub mod controller;
pub mod date_picker;
pub mod error;
pub mod markdown;
pub mod model;
pub mod presenter;

pub use client::{ForecastClient, HttpForecastClient};
pub use config::Config;
pub use controller::{FormController, FormState};
pub use date_picker::DatePicker;
pub use error::SubmitError;
pub use model::{ChatMessage, ForecastRequest, ForecastResponse, ForecastStyle, Sender, WeatherData};
pub use presenter::{Entry, ErrorBanner, ErrorSlot, Presenter, Scroll, Transcript, WeatherCard};
