use serde::Deserialize;

/// Failure talking to the queue service.
///
/// Payloads are kept as text so errors can travel inside UI messages.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApiError {
    #[error("request failed: {0}")]
    Network(String),

    #[error("HTTP {status}: {message}")]
    Status { status: u16, message: String },

    #[error("unexpected response body: {0}")]
    Decode(String),

    #[error("invalid URL: {0}")]
    InvalidUrl(String),
}

impl ApiError {
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ApiError::Status { status: 401 | 403, .. })
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ApiError::Decode(err.to_string())
        } else {
            ApiError::Network(err.to_string())
        }
    }
}

impl From<url::ParseError> for ApiError {
    fn from(err: url::ParseError) -> Self {
        ApiError::InvalidUrl(err.to_string())
    }
}

#[derive(Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

/// The `message` of a JSON error body. Anything else is never shown to the user.
pub(crate) fn error_message(body: &str) -> Option<String> {
    serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|reply| reply.message)
        .filter(|message| !message.trim().is_empty())
}

pub(crate) async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response, ApiError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let error_text = response.text().await.unwrap_or_default();
    let message = error_message(&error_text)
        .unwrap_or_else(|| status.canonical_reason().unwrap_or_default().to_string());

    Err(ApiError::Status {
        status: status.as_u16(),
        message,
    })
}
