use tracing::{info, warn};

use super::error::ApiError;
use super::{endpoint, parse_base_url};
use crate::constants;
use crate::models::{AuthResponse, Credentials};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    /// The service answered with a non-2xx status, with its `message` if it sent one
    #[error("rejected: {}", .0.as_deref().unwrap_or("no message"))]
    Rejected(Option<String>),

    #[error(transparent)]
    Request(#[from] ApiError),

    /// 2xx from login without a token in the body
    #[error("response did not contain a token")]
    MissingToken,
}

impl AuthError {
    /// Text shown inline under the form.
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            AuthError::Rejected(Some(message)) => message.clone(),
            _ => fallback.to_string(),
        }
    }
}

/// Rejection for a non-2xx reply. Only a JSON `message` is ever surfaced.
fn rejection(body: &str) -> AuthError {
    let message = serde_json::from_str::<AuthResponse>(body)
        .ok()
        .and_then(|reply| reply.message)
        .filter(|message| !message.trim().is_empty());
    AuthError::Rejected(message)
}

async fn post_credentials(
    base_url: &str,
    path: &str,
    credentials: &Credentials,
) -> Result<AuthResponse, AuthError> {
    let url = endpoint(&parse_base_url(base_url)?, path)?;

    let response = reqwest::Client::new()
        .post(url)
        .json(credentials)
        .send()
        .await
        .map_err(ApiError::from)?;

    let status = response.status();
    let body = response.text().await.map_err(ApiError::from)?;

    if !status.is_success() {
        warn!("{} rejected with HTTP {}", path, status);
        return Err(rejection(&body));
    }

    serde_json::from_str::<AuthResponse>(&body)
        .map_err(|e| AuthError::Request(ApiError::Decode(e.to_string())))
}

/// Exchanges credentials for a bearer token.
pub async fn login(base_url: String, credentials: Credentials) -> Result<String, AuthError> {
    let reply = post_credentials(&base_url, constants::LOGIN_PATH, &credentials).await?;
    let token = reply.token.ok_or(AuthError::MissingToken)?;
    info!("Logged in as {}", credentials.username);
    Ok(token)
}

/// Creates an account. Returns a token when the service hands one out.
pub async fn signup(base_url: String, credentials: Credentials) -> Result<Option<String>, AuthError> {
    let reply = post_credentials(&base_url, constants::SIGNUP_PATH, &credentials).await?;
    info!("Signed up as {}", credentials.username);
    Ok(reply.token)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejected_message_is_shown_verbatim() {
        let err = rejection(r#"{"message":"Invalid credentials"}"#);
        assert_eq!(err, AuthError::Rejected(Some("Invalid credentials".to_string())));
        assert_eq!(err.user_message("Login failed"), "Invalid credentials");
    }

    #[test]
    fn html_rejection_falls_back() {
        let err = rejection("<html><body><h1>500 Internal Server Error</h1></body></html>");
        assert_eq!(err, AuthError::Rejected(None));
        assert_eq!(err.user_message("Login failed"), "Login failed");
    }

    #[test]
    fn json_rejection_without_message_falls_back() {
        assert_eq!(rejection(r#"{"error":"taken"}"#).user_message("Signup failed"), "Signup failed");
        assert_eq!(rejection(r#"{"message":""}"#).user_message("Signup failed"), "Signup failed");
        assert_eq!(rejection("").user_message("Login failed"), "Login failed");
    }

    #[test]
    fn other_failures_fall_back() {
        assert_eq!(
            AuthError::Request(ApiError::Network("refused".to_string())).user_message("Signup failed"),
            "Signup failed"
        );
        assert_eq!(AuthError::MissingToken.user_message("Login failed"), "Login failed");
    }
}
