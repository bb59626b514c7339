use tracing::{info, warn};

use crate::{
    Config,
    client::ForecastClient,
    error::SubmitError,
    model::{ForecastRequest, ForecastResponse, ForecastStyle, Sender},
    presenter::Presenter,
};

/// Raw values of the form inputs, as the widgets hand them over.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormState {
    pub date: String,
    pub report_length: String,
}

/// Owns the form and routes each submission's outcome to the presenter.
///
/// A submission is `prepare` (validate, record the user message, build the
/// request) followed by `complete` (show a card or an error). Nothing stops
/// several prepared requests from being in flight at once; their results
/// land in the transcript in the order they are completed.
#[derive(Debug)]
pub struct FormController {
    form: FormState,
    style: ForecastStyle,
    presenter: Presenter,
}

impl FormController {
    pub fn new(config: &Config) -> Self {
        Self::with_presenter(Presenter::new(config.error_dismiss_after()), config.style)
    }

    pub fn with_presenter(presenter: Presenter, style: ForecastStyle) -> Self {
        Self { form: FormState::default(), style, presenter }
    }

    pub fn form(&self) -> &FormState {
        &self.form
    }

    pub fn set_date(&mut self, date: impl Into<String>) {
        self.form.date = date.into();
    }

    pub fn set_report_length(&mut self, report_length: impl Into<String>) {
        self.form.report_length = report_length.into();
    }

    pub fn presenter(&self) -> &Presenter {
        &self.presenter
    }

    pub fn presenter_mut(&mut self) -> &mut Presenter {
        &mut self.presenter
    }

    /// Run one full submission against `client`.
    pub async fn submit<C>(&mut self, client: &C) -> Result<ForecastResponse, SubmitError>
    where
        C: ForecastClient + ?Sized,
    {
        let request = self.prepare()?;
        let outcome = client.generate_forecast(&request).await;
        self.complete(outcome)
    }

    /// First half of a submission.
    ///
    /// An empty date records nothing. Otherwise the user message is appended
    /// before anything is sent; a report length that is not a whole number
    /// stops the submission there.
    pub fn prepare(&mut self) -> Result<ForecastRequest, SubmitError> {
        if self.form.date.trim().is_empty() {
            return Err(self.fail(SubmitError::MissingDate));
        }

        self.presenter.clear_error();

        let FormState { date, report_length } = &self.form;
        let text = format!("Date: {date} ({report_length} words report)");
        self.presenter.append_message(Sender::User, &text);

        let Ok(length) = report_length.trim().parse::<u32>() else {
            let err = SubmitError::InvalidReportLength(report_length.clone());
            return Err(self.fail(err));
        };

        info!(date = %date, report_length = length, style = %self.style, "submitting forecast request");

        Ok(ForecastRequest { date: date.clone(), style: self.style, report_length: length })
    }

    /// Second half of a submission: route the outcome, then clear the date.
    pub fn complete(
        &mut self,
        outcome: Result<ForecastResponse, SubmitError>,
    ) -> Result<ForecastResponse, SubmitError> {
        match outcome {
            Ok(response) => {
                self.presenter.build_card(&response);
                self.form.date.clear();
                Ok(response)
            }
            Err(err) => Err(self.fail(err)),
        }
    }

    fn fail(&mut self, err: SubmitError) -> SubmitError {
        warn!(error = %err, "forecast submission failed");
        self.presenter.show_error(err.to_string());
        self.form.date.clear();
        err
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        error::CONNECTIVITY_MESSAGE,
        model::WeatherData,
        presenter::Entry,
    };
    use async_trait::async_trait;
    use std::{
        collections::VecDeque,
        sync::Mutex,
        time::Duration,
    };

    #[derive(Debug, Default)]
    struct FakeClient {
        replies: Mutex<VecDeque<Result<ForecastResponse, SubmitError>>>,
        requests: Mutex<Vec<ForecastRequest>>,
    }

    impl FakeClient {
        fn replying(replies: Vec<Result<ForecastResponse, SubmitError>>) -> Self {
            Self { replies: Mutex::new(replies.into()), requests: Mutex::default() }
        }

        fn requests(&self) -> Vec<ForecastRequest> {
            self.requests.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl ForecastClient for FakeClient {
        async fn generate_forecast(
            &self,
            request: &ForecastRequest,
        ) -> Result<ForecastResponse, SubmitError> {
            self.requests.lock().unwrap().push(request.clone());
            self.replies.lock().unwrap().pop_front().expect("unexpected request")
        }
    }

    fn forecast(text: &str, temperature: f64) -> ForecastResponse {
        ForecastResponse {
            date: None,
            forecast: text.into(),
            data_used: WeatherData {
                temperature_2m: Some(temperature),
                relative_humidity_2m: Some(60.0),
                precipitation: Some(1.5),
                wind_speed_10m: Some(12.25),
            },
        }
    }

    fn controller() -> FormController {
        FormController::new(&Config::default())
    }

    fn user_messages(ctl: &FormController) -> Vec<String> {
        ctl.presenter()
            .transcript()
            .entries()
            .iter()
            .filter_map(|entry| match entry {
                Entry::Message { message, .. } if message.sender == Sender::User => {
                    Some(message.content.clone())
                }
                _ => None,
            })
            .collect()
    }

    #[tokio::test]
    async fn successful_submission_sends_one_request_and_appends_card() {
        let client = FakeClient::replying(vec![Ok(forecast("Clear", 14.0))]);
        let mut ctl = controller();
        ctl.set_date("2025-03-10");
        ctl.set_report_length("200");

        let resp = ctl.submit(&client).await.unwrap();
        assert_eq!(resp.forecast, "Clear");

        assert_eq!(
            client.requests(),
            vec![ForecastRequest {
                date: "2025-03-10".into(),
                style: ForecastStyle::Balanced,
                report_length: 200,
            }]
        );

        let transcript = ctl.presenter().transcript();
        // welcome, user message, card
        assert_eq!(transcript.len(), 3);
        assert_eq!(transcript.cards().count(), 1);
        assert_eq!(user_messages(&ctl), vec!["Date: 2025-03-10 (200 words report)"]);
        assert!(ctl.form().date.is_empty());
        assert!(!ctl.presenter().error_slot().is_visible());
    }

    #[tokio::test]
    async fn request_error_shows_body_and_appends_no_card() {
        let client =
            FakeClient::replying(vec![Err(SubmitError::Request("No weather data found".into()))]);
        let mut ctl = controller();
        ctl.set_date("2025-03-10");
        ctl.set_report_length("100");

        let err = ctl.submit(&client).await.unwrap_err();
        assert_eq!(err, SubmitError::Request("No weather data found".into()));

        assert_eq!(ctl.presenter().transcript().cards().count(), 0);
        assert_eq!(user_messages(&ctl).len(), 1);
        assert_eq!(
            ctl.presenter().error_slot().message().as_deref(),
            Some("No weather data found")
        );
        assert!(ctl.form().date.is_empty());
    }

    #[tokio::test]
    async fn connectivity_error_uses_fixed_message() {
        let client = FakeClient::replying(vec![Err(SubmitError::Connectivity)]);
        let mut ctl = controller();
        ctl.set_date("2025-03-10");
        ctl.set_report_length("100");

        ctl.submit(&client).await.unwrap_err();
        assert_eq!(
            ctl.presenter().error_slot().message().as_deref(),
            Some(CONNECTIVITY_MESSAGE)
        );
    }

    #[tokio::test]
    async fn non_numeric_report_length_sends_nothing() {
        let client = FakeClient::default();
        let mut ctl = controller();
        ctl.set_date("2025-03-10");
        ctl.set_report_length("short");

        let err = ctl.submit(&client).await.unwrap_err();
        assert_eq!(err, SubmitError::InvalidReportLength("short".into()));

        assert!(client.requests().is_empty());
        assert_eq!(user_messages(&ctl), vec!["Date: 2025-03-10 (short words report)"]);
        assert!(ctl.presenter().error_slot().message().unwrap().contains("short"));
        assert!(ctl.form().date.is_empty());
    }

    #[tokio::test]
    async fn zero_report_length_is_accepted() {
        let client = FakeClient::replying(vec![Ok(forecast("", 0.0))]);
        let mut ctl = controller();
        ctl.set_date("2024-01-01");
        ctl.set_report_length(" 0 ");

        ctl.submit(&client).await.unwrap();
        assert_eq!(client.requests()[0].report_length, 0);
    }

    #[tokio::test]
    async fn missing_date_records_nothing() {
        let client = FakeClient::default();
        let mut ctl = controller();
        ctl.set_date("   ");
        ctl.set_report_length("200");

        let err = ctl.submit(&client).await.unwrap_err();
        assert_eq!(err, SubmitError::MissingDate);
        assert!(client.requests().is_empty());
        assert!(user_messages(&ctl).is_empty());
        assert!(ctl.presenter().error_slot().is_visible());
    }

    #[tokio::test]
    async fn user_text_is_never_markup() {
        let client = FakeClient::replying(vec![Ok(forecast("ok", 1.0))]);
        let mut ctl = controller();
        ctl.set_date("<img src=x>&amp;");
        ctl.set_report_length("50");

        ctl.submit(&client).await.unwrap();

        // The controller forwards the date untouched; only the view escapes it.
        assert_eq!(client.requests()[0].date, "<img src=x>&amp;");
        let html = ctl.presenter().render_html();
        assert!(html.contains("Date: &lt;img src=x&gt;&amp;amp; (50 words report)"));
        assert!(!html.contains("<img src=x>"));
    }

    #[tokio::test(start_paused = true)]
    async fn new_submission_clears_previous_error() {
        let client = FakeClient::replying(vec![
            Err(SubmitError::Request("boom".into())),
            Ok(forecast("fine", 3.0)),
        ]);
        let mut ctl = controller();

        ctl.set_date("2025-01-01");
        ctl.set_report_length("100");
        ctl.submit(&client).await.unwrap_err();
        assert!(ctl.presenter().error_slot().is_visible());

        ctl.set_date("2025-01-02");
        ctl.submit(&client).await.unwrap();
        assert!(!ctl.presenter().error_slot().is_visible());

        // The cancelled timer must not fire into a later error.
        tokio::time::sleep(Duration::from_secs(3)).await;
        ctl.presenter_mut().show_error("later");
        tokio::time::sleep(Duration::from_secs(3)).await;
        assert_eq!(ctl.presenter().error_slot().message().as_deref(), Some("later"));
    }

    #[tokio::test(start_paused = true)]
    async fn error_banner_hides_after_five_seconds() {
        let client = FakeClient::replying(vec![Err(SubmitError::from_body(""))]);
        let mut ctl = controller();
        ctl.set_date("2025-01-01");
        ctl.set_report_length("100");

        ctl.submit(&client).await.unwrap_err();
        assert_eq!(
            ctl.presenter().error_slot().message().as_deref(),
            Some("Failed to get forecast")
        );

        tokio::time::sleep(Duration::from_millis(5_100)).await;
        assert!(!ctl.presenter().error_slot().is_visible());
    }

    #[tokio::test]
    async fn overlapping_submissions_append_in_completion_order() {
        let mut ctl = controller();
        ctl.set_report_length("100");

        ctl.set_date("2025-01-01");
        let first = ctl.prepare().unwrap();
        ctl.set_date("2025-01-02");
        let second = ctl.prepare().unwrap();

        assert_eq!(first.date, "2025-01-01");
        assert_eq!(second.date, "2025-01-02");

        // The second request resolves first.
        ctl.complete(Ok(forecast("second", 2.0))).unwrap();
        ctl.complete(Ok(forecast("first", 1.0))).unwrap();

        let order: Vec<_> =
            ctl.presenter().transcript().cards().map(|card| card.forecast.as_str()).collect();
        assert_eq!(order, vec!["second", "first"]);
        assert_eq!(user_messages(&ctl).len(), 2);
    }

    #[test]
    fn missing_date_works_without_runtime() {
        let mut ctl = controller();

        assert_eq!(ctl.prepare().unwrap_err(), SubmitError::MissingDate);
        assert_eq!(
            ctl.presenter().error_slot().message().as_deref(),
            Some("Please select a date.")
        );
    }

    #[test]
    fn configured_style_is_sent() {
        let cfg = Config { style: ForecastStyle::Broadcast, ..Config::default() };
        let mut ctl = FormController::with_presenter(
            Presenter::empty(cfg.error_dismiss_after()),
            cfg.style,
        );
        ctl.set_date("2025-06-01");
        ctl.set_report_length("300");

        let req = ctl.prepare().unwrap();
        assert_eq!(req.style, ForecastStyle::Broadcast);
        assert_eq!(req.report_length, 300);
    }
}
