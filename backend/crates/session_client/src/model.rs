//! Wire models shared with the auth routes

use serde::{Deserialize, Serialize};

/// Account projection returned alongside every access token
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountSummary {
    pub id: String,
    pub email: String,
    pub name: String,
    pub role: String,
}

/// Body of `/login`, `/refresh` and `/whoami`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionGrant {
    pub account: AccountSummary,
    pub access_token: String,
    /// Unix milliseconds
    pub access_token_expires_at_ms: i64,
}

#[derive(Debug, Serialize)]
pub(crate) struct LoginRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

/// Problem-details body the server renders for errors
#[derive(Debug, Deserialize)]
pub(crate) struct ProblemBody {
    #[serde(default)]
    pub detail: Option<String>,
}
