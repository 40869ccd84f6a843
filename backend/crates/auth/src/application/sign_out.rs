//! Sign Out Use Cases
//!
//! Sign-out removes one device's refresh token; sign-out-everywhere clears
//! the whole set. Access tokens already handed out stay valid until they
//! expire on their own.

use std::sync::Arc;

use crate::application::token::{TokenCodec, TokenKind};
use crate::domain::repository::AccountRepository;
use crate::domain::value_object::account_id::AccountId;
use crate::error::AuthResult;

/// Sign out use case
pub struct SignOutUseCase<R>
where
    R: AccountRepository,
{
    repo: Arc<R>,
    codec: Arc<TokenCodec>,
}

impl<R> SignOutUseCase<R>
where
    R: AccountRepository,
{
    pub fn new(repo: Arc<R>, codec: Arc<TokenCodec>) -> Self {
        Self { repo, codec }
    }

    /// Forget this device's refresh token
    ///
    /// Always succeeds from the caller's point of view; returns whether a
    /// stored token was actually removed.
    pub async fn execute(&self, refresh_token: Option<&str>) -> AuthResult<bool> {
        let Some(token) = refresh_token else {
            return Ok(false);
        };

        // Expired tokens are still removed from the store.
        let claims = match self.codec.verify_signature(token, TokenKind::Refresh) {
            Ok(claims) => claims,
            Err(e) => {
                tracing::debug!(reason = %e, "Sign-out with unusable refresh token");
                return Ok(false);
            }
        };

        let removed = self.repo.remove_refresh_token(&claims.sub, token).await?;

        tracing::info!(account_id = %claims.sub, removed, "Account signed out");

        Ok(removed)
    }

    /// Revoke every refresh token of the account
    pub async fn execute_everywhere(&self, account_id: &AccountId) -> AuthResult<u64> {
        let revoked = self.repo.clear_refresh_tokens(account_id).await?;

        tracing::info!(account_id = %account_id, revoked, "Account signed out everywhere");

        Ok(revoked)
    }
}
