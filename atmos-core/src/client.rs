use async_trait::async_trait;
use reqwest::{Client, header};
use std::fmt::Debug;
use tracing::{debug, warn};

use crate::{
    Config,
    error::SubmitError,
    model::{ForecastRequest, ForecastResponse},
};

/// Anything that can turn a forecast request into a forecast.
#[async_trait]
pub trait ForecastClient: Send + Sync + Debug {
    async fn generate_forecast(
        &self,
        request: &ForecastRequest,
    ) -> Result<ForecastResponse, SubmitError>;
}

/// Talks to the forecast server over HTTP.
///
/// No timeout or retry is configured; the transport defaults apply.
#[derive(Debug, Clone)]
pub struct HttpForecastClient {
    url: String,
    http: Client,
}

impl HttpForecastClient {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into(), http: Client::new() }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.forecast_url())
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl ForecastClient for HttpForecastClient {
    async fn generate_forecast(
        &self,
        request: &ForecastRequest,
    ) -> Result<ForecastResponse, SubmitError> {
        debug!(url = %self.url, date = %request.date, report_length = request.report_length, "sending forecast request");

        let res = self
            .http
            .post(&self.url)
            .header(header::ACCEPT, "application/json")
            .json(request)
            .send()
            .await
            .map_err(|err| {
                warn!(error = %err, "forecast server unreachable");
                SubmitError::Connectivity
            })?;

        let status = res.status();
        debug!(%status, "forecast response received");

        let body = res.text().await.map_err(|err| {
            warn!(error = %err, "failed to read forecast response body");
            SubmitError::Connectivity
        })?;

        if !status.is_success() {
            warn!(%status, body = %body, "forecast request failed");
            return Err(SubmitError::from_body(&body));
        }

        serde_json::from_str(&body).map_err(|err| {
            warn!(error = %err, "forecast response is not valid JSON");
            SubmitError::MalformedResponse(err.to_string())
        })
    }
}
