use thiserror::Error;

/// Banner text shown when the server is unreachable.
pub const CONNECTIVITY_MESSAGE: &str = "Failed to connect to the server. Please try again later.";

/// Banner text for a non-2xx reply without a body.
pub const DEFAULT_REQUEST_MESSAGE: &str = "Failed to get forecast";

/// Why a submission did not produce a card.
///
/// `Display` is exactly the text the error slot shows.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubmitError {
    #[error("Please select a date.")]
    MissingDate,

    #[error("Invalid report length '{0}': expected a whole number of words.")]
    InvalidReportLength(String),

    /// Non-2xx reply; carries the response body.
    #[error("{0}")]
    Request(String),

    #[error("{}", CONNECTIVITY_MESSAGE)]
    Connectivity,

    #[error("Unexpected response from server: {0}")]
    MalformedResponse(String),
}

impl SubmitError {
    /// Build a request error from a response body, falling back to the default text.
    pub fn from_body(body: &str) -> Self {
        if body.trim().is_empty() {
            SubmitError::Request(DEFAULT_REQUEST_MESSAGE.to_string())
        } else {
            SubmitError::Request(body.to_string())
        }
    }
}
