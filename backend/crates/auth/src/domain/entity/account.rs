//! Account Entity
//!
//! One record per person: credentials, role, active flag, and the set of
//! refresh tokens currently valid for the account (one per signed-in device).

use chrono::{DateTime, Utc};
use platform::crypto::constant_time_eq;
use serde::Serialize;
use std::fmt;

use crate::domain::value_object::{
    account_id::AccountId, account_password::AccountPassword, display_name::DisplayName,
    email::Email, role::Role,
};

/// Account entity
#[derive(Clone)]
pub struct Account {
    pub account_id: AccountId,
    /// Unique, normalised sign-in identifier
    pub email: Email,
    pub display_name: DisplayName,
    pub password_hash: AccountPassword,
    pub role: Role,
    /// Inactive accounts cannot sign in or use existing tokens
    pub active: bool,
    /// Refresh tokens issued and not yet revoked
    pub refresh_tokens: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Account {
    /// Create a new active account with no sessions
    pub fn new(
        email: Email,
        display_name: DisplayName,
        password_hash: AccountPassword,
        role: Role,
    ) -> Self {
        let now = Utc::now();

        Self {
            account_id: AccountId::new(),
            email,
            display_name,
            password_hash,
            role,
            active: true,
            refresh_tokens: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn can_sign_in(&self) -> bool {
        self.active
    }

    /// Whether `token` is one of this account's live refresh tokens
    pub fn holds_refresh_token(&self, token: &str) -> bool {
        self.refresh_tokens
            .iter()
            .fold(false, |found, held| {
                constant_time_eq(held.as_bytes(), token.as_bytes()) | found
            })
    }

    /// Sanitised projection (no hash, no tokens)
    pub fn view(&self) -> AccountView {
        AccountView {
            id: self.account_id,
            email: self.email.as_str().to_string(),
            name: self.display_name.as_str().to_string(),
            role: self.role,
            active: self.active,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

impl fmt::Debug for Account {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Account")
            .field("account_id", &self.account_id)
            .field("email", &self.email)
            .field("role", &self.role)
            .field("active", &self.active)
            .field("refresh_tokens", &self.refresh_tokens.len())
            .finish_non_exhaustive()
    }
}

/// Account as shown to clients
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountView {
    pub id: AccountId,
    pub email: String,
    pub name: String,
    pub role: Role,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Administrative change to an account; `None` leaves a field untouched
#[derive(Debug, Default)]
pub struct AccountPatch {
    pub display_name: Option<DisplayName>,
    pub email: Option<Email>,
    pub role: Option<Role>,
    pub active: Option<bool>,
    pub password_hash: Option<AccountPassword>,
}

impl AccountPatch {
    pub fn is_empty(&self) -> bool {
        self.display_name.is_none()
            && self.email.is_none()
            && self.role.is_none()
            && self.active.is_none()
            && self.password_hash.is_none()
    }

    /// True when the patch changes the password and nothing else
    pub fn is_password_only(&self) -> bool {
        self.password_hash.is_some()
            && self.display_name.is_none()
            && self.email.is_none()
            && self.role.is_none()
            && self.active.is_none()
    }

    /// Whether applying the patch leaves the account unable to sign in
    pub fn deactivates(&self) -> bool {
        self.active == Some(false)
    }

    pub fn apply(self, account: &mut Account) {
        if let Some(name) = self.display_name {
            account.display_name = name;
        }
        if let Some(email) = self.email {
            account.email = email;
        }
        if let Some(role) = self.role {
            account.role = role;
        }
        if let Some(active) = self.active {
            account.active = active;
        }
        if let Some(hash) = self.password_hash {
            account.password_hash = hash;
        }
        account.updated_at = Utc::now();
    }
}
