//! Repository Traits
//!
//! Interfaces for data persistence. Implementations live in the
//! infrastructure layer.
//!
//! The refresh-token operations are single atomic updates so two devices
//! (or two tabs) racing on the same account never lose each other's entry.

use crate::domain::entity::account::Account;
use crate::domain::value_object::{account_id::AccountId, email::Email, role::Role};
use crate::error::AuthResult;

/// Listing filter for administrative queries
#[derive(Debug, Clone)]
pub struct AccountQuery {
    /// Only accounts with one of these roles
    pub roles: Vec<Role>,
    /// Case-insensitive substring of email or display name
    pub search: Option<String>,
    /// 1-based page number
    pub page: u32,
    pub per_page: u32,
}

impl AccountQuery {
    pub fn offset(&self) -> u64 {
        u64::from(self.page.saturating_sub(1)) * u64::from(self.per_page)
    }
}

/// One page of accounts plus the total match count
#[derive(Debug, Clone)]
pub struct AccountPage {
    pub items: Vec<Account>,
    pub total: u64,
}

/// Account repository trait
#[trait_variant::make(AccountRepository: Send)]
pub trait LocalAccountRepository {
    /// Insert a new account; `EmailTaken` when the email is in use
    async fn create(&self, account: &Account) -> AuthResult<()>;

    async fn find_by_id(&self, account_id: &AccountId) -> AuthResult<Option<Account>>;

    async fn find_by_email(&self, email: &Email) -> AuthResult<Option<Account>>;

    async fn exists_by_email(&self, email: &Email) -> AuthResult<bool>;

    /// Persist profile fields (email, name, hash, role, active)
    ///
    /// Never touches `refresh_tokens`.
    async fn update_profile(&self, account: &Account) -> AuthResult<()>;

    /// Returns false when no such account existed
    async fn delete(&self, account_id: &AccountId) -> AuthResult<bool>;

    /// Append a refresh token and drop any held token listed in `retire`,
    /// in one write; false when the account is gone
    async fn push_refresh_token(
        &self,
        account_id: &AccountId,
        token: &str,
        retire: &[String],
    ) -> AuthResult<bool>;

    /// Remove one refresh token; false when it was not present
    async fn remove_refresh_token(&self, account_id: &AccountId, token: &str)
    -> AuthResult<bool>;

    /// Swap `old` for `new` in one step; false when `old` was not present
    async fn replace_refresh_token(
        &self,
        account_id: &AccountId,
        old: &str,
        new: &str,
    ) -> AuthResult<bool>;

    /// Revoke every session; returns how many tokens were removed
    async fn clear_refresh_tokens(&self, account_id: &AccountId) -> AuthResult<u64>;

    /// Newest first
    async fn list(&self, query: &AccountQuery) -> AuthResult<AccountPage>;
}
