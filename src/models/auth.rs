use serde::{Deserialize, Serialize};

#[derive(Serialize, Clone, PartialEq, Eq, Debug, Default)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

/// Reply of `/auth/login` and `/auth/signup`. Errors carry `message` instead of `token`.
#[derive(Deserialize, Clone, PartialEq, Eq, Debug, Default)]
pub struct AuthResponse {
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}
