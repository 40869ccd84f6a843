//! API DTOs (Data Transfer Objects)

use serde::{Deserialize, Serialize};

use crate::application::{AccountList, SessionGrant, UpdateAccountInput};
use crate::domain::entity::account::AccountView;
use crate::domain::value_object::role::Role;

// ============================================================================
// Sign Up
// ============================================================================

/// Sign up request
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignUpRequest {
    pub email: String,
    pub password: String,
    pub name: String,
}

/// Sign up response
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SignUpResponse {
    pub account: AccountView,
}

// ============================================================================
// Sign In / Refresh / Who Am I
// ============================================================================

/// Sign in request
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignInRequest {
    pub email: String,
    pub password: String,
}

/// Body returned whenever a session is started or renewed
///
/// The refresh token never appears here; it travels in an HttpOnly cookie.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionResponse {
    pub account: AccountView,
    pub access_token: String,
    /// Unix milliseconds
    pub access_token_expires_at_ms: i64,
}

impl From<&SessionGrant> for SessionResponse {
    fn from(grant: &SessionGrant) -> Self {
        Self {
            account: grant.account.clone(),
            access_token: grant.access_token.token.clone(),
            access_token_expires_at_ms: grant.access_token.expires_at_ms,
        }
    }
}

// ============================================================================
// Sign Out
// ============================================================================

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SignOutResponse {
    pub signed_out: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RevokedSessionsResponse {
    pub revoked_sessions: u64,
}

// ============================================================================
// Account Administration
// ============================================================================

/// Query string for account listings
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListAccountsQuery {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
    /// Substring of email or name
    pub q: Option<String>,
    pub role: Option<Role>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountListResponse {
    pub items: Vec<AccountView>,
    pub total: u64,
    pub page: u32,
    pub per_page: u32,
}

impl From<AccountList> for AccountListResponse {
    fn from(list: AccountList) -> Self {
        Self {
            items: list.items,
            total: list.total,
            page: list.page,
            per_page: list.per_page,
        }
    }
}

/// Partial account update; omitted fields stay as they are
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct UpdateAccountRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub role: Option<Role>,
    pub active: Option<bool>,
    pub password: Option<String>,
}

impl From<UpdateAccountRequest> for UpdateAccountInput {
    fn from(req: UpdateAccountRequest) -> Self {
        Self {
            name: req.name,
            email: req.email,
            role: req.role,
            active: req.active,
            password: req.password,
        }
    }
}
