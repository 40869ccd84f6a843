//! Refresh Session Use Case
//!
//! Exchanges a live refresh token for a new access token. With rotation
//! enabled the refresh token is swapped for a new one in the same store
//! write; a token that lost the race is treated as revoked.

use std::sync::Arc;

use crate::application::config::AuthConfig;
use crate::application::sign_in::SessionGrant;
use crate::application::token::{TokenCodec, TokenKind};
use crate::domain::entity::account::Account;
use crate::domain::repository::AccountRepository;
use crate::error::{AuthError, AuthResult};

/// Refresh session use case
pub struct RefreshSessionUseCase<R>
where
    R: AccountRepository,
{
    repo: Arc<R>,
    codec: Arc<TokenCodec>,
    config: Arc<AuthConfig>,
}

impl<R> RefreshSessionUseCase<R>
where
    R: AccountRepository,
{
    pub fn new(repo: Arc<R>, codec: Arc<TokenCodec>, config: Arc<AuthConfig>) -> Self {
        Self {
            repo,
            codec,
            config,
        }
    }

    pub async fn execute(&self, refresh_token: Option<&str>) -> AuthResult<SessionGrant> {
        let refresh_token = refresh_token.ok_or(AuthError::InvalidSession)?;
        let account = self.resolve(refresh_token).await?;

        // Role is read fresh here, so a role change lands at the next refresh.
        let access_token = self.codec.issue(
            account.account_id,
            account.role,
            TokenKind::Access,
            self.config.access_token_ttl,
        )?;

        let refresh_token = if self.config.rotate_refresh_tokens {
            let next = self.codec.issue(
                account.account_id,
                account.role,
                TokenKind::Refresh,
                self.config.refresh_token_ttl,
            )?;
            if !self
                .repo
                .replace_refresh_token(&account.account_id, refresh_token, &next.token)
                .await?
            {
                tracing::warn!(
                    account_id = %account.account_id,
                    "Refresh token was retired concurrently"
                );
                return Err(AuthError::InvalidSession);
            }
            Some(next)
        } else {
            None
        };

        tracing::debug!(
            account_id = %account.account_id,
            rotated = refresh_token.is_some(),
            "Session refreshed"
        );

        Ok(SessionGrant {
            account: account.view(),
            access_token,
            refresh_token,
        })
    }

    /// Account behind a refresh token that is signed, unexpired and still held
    async fn resolve(&self, refresh_token: &str) -> AuthResult<Account> {
        let claims = self
            .codec
            .verify(refresh_token, TokenKind::Refresh)
            .map_err(|e| {
                tracing::debug!(reason = %e, "Refresh token rejected");
                AuthError::InvalidSession
            })?;

        let account = self
            .repo
            .find_by_id(&claims.sub)
            .await?
            .ok_or(AuthError::InvalidSession)?;

        if !account.can_sign_in() {
            return Err(AuthError::InvalidSession);
        }

        if !account.holds_refresh_token(refresh_token) {
            tracing::warn!(
                account_id = %account.account_id,
                "Revoked refresh token presented"
            );
            return Err(AuthError::InvalidSession);
        }

        Ok(account)
    }
}
