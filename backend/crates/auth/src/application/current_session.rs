//! Current Session Use Case ("who am I")
//!
//! Used by clients on startup. A still-valid access token is answered
//! directly; otherwise the refresh token, if any, renews the session.

use std::sync::Arc;

use crate::application::config::AuthConfig;
use crate::application::refresh_session::RefreshSessionUseCase;
use crate::application::sign_in::SessionGrant;
use crate::application::token::{IssuedToken, TokenCodec, TokenKind};
use crate::domain::repository::AccountRepository;
use crate::error::{AuthError, AuthResult};

/// Current session use case
pub struct CurrentSessionUseCase<R>
where
    R: AccountRepository,
{
    repo: Arc<R>,
    codec: Arc<TokenCodec>,
    config: Arc<AuthConfig>,
}

impl<R> CurrentSessionUseCase<R>
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

    pub async fn execute(
        &self,
        access_token: Option<&str>,
        refresh_token: Option<&str>,
    ) -> AuthResult<SessionGrant> {
        if let Some(token) = access_token {
            if let Ok(claims) = self.codec.verify(token, TokenKind::Access) {
                if let Some(account) = self.repo.find_by_id(&claims.sub).await? {
                    if account.can_sign_in() {
                        return Ok(SessionGrant {
                            account: account.view(),
                            access_token: IssuedToken {
                                token: token.to_string(),
                                expires_at_ms: claims.exp,
                            },
                            refresh_token: None,
                        });
                    }
                }
            }
        }

        if refresh_token.is_none() {
            return Err(AuthError::Unauthenticated);
        }

        RefreshSessionUseCase::new(self.repo.clone(), self.codec.clone(), self.config.clone())
            .execute(refresh_token)
            .await
    }
}
