//! Sign In Use Case
//!
//! Verifies credentials and starts a new session: one access token, one
//! refresh token, and the refresh token appended to the account's set.

use std::sync::{Arc, OnceLock};

use platform::crypto::{random_bytes, to_base64url};

use crate::application::config::AuthConfig;
use crate::application::token::{IssuedToken, TokenCodec, TokenKind};
use crate::domain::entity::account::AccountView;
use crate::domain::repository::AccountRepository;
use crate::domain::value_object::{
    account_password::{AccountPassword, RawPassword},
    email::Email,
};
use crate::error::{AuthError, AuthResult};

/// Sign in input
pub struct SignInInput {
    pub email: String,
    pub password: String,
}

/// Tokens and account for a freshly started or renewed session
#[derive(Debug, Clone)]
pub struct SessionGrant {
    pub account: AccountView,
    pub access_token: IssuedToken,
    /// Present when a new refresh token must be handed to the client
    pub refresh_token: Option<IssuedToken>,
}

/// Sign in use case
pub struct SignInUseCase<R>
where
    R: AccountRepository,
{
    repo: Arc<R>,
    codec: Arc<TokenCodec>,
    config: Arc<AuthConfig>,
}

impl<R> SignInUseCase<R>
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

    pub async fn execute(&self, input: SignInInput) -> AuthResult<SessionGrant> {
        let email = Email::new(&input.email).map_err(|_| AuthError::InvalidCredentials)?;
        let password = RawPassword::for_sign_in(input.password);

        let Some(account) = self.repo.find_by_email(&email).await? else {
            // Spend the same hashing work as a wrong password
            if let Some(dummy) = dummy_password_hash() {
                let _ = dummy.verify(&password, self.config.pepper());
            }
            return Err(AuthError::InvalidCredentials);
        };

        if !account.password_hash.verify(&password, self.config.pepper()) {
            return Err(AuthError::InvalidCredentials);
        }

        if !account.can_sign_in() {
            return Err(AuthError::AccountDisabled);
        }

        let access_token = self.codec.issue(
            account.account_id,
            account.role,
            TokenKind::Access,
            self.config.access_token_ttl,
        )?;
        let refresh_token = self.codec.issue(
            account.account_id,
            account.role,
            TokenKind::Refresh,
            self.config.refresh_token_ttl,
        )?;

        // Expired or unreadable entries can never refresh again
        let stale: Vec<String> = account
            .refresh_tokens
            .iter()
            .filter(|held| self.codec.verify(held, TokenKind::Refresh).is_err())
            .cloned()
            .collect();

        if !self
            .repo
            .push_refresh_token(&account.account_id, &refresh_token.token, &stale)
            .await?
        {
            // Deleted between lookup and write
            return Err(AuthError::InvalidCredentials);
        }

        tracing::info!(
            account_id = %account.account_id,
            role = %account.role,
            "Account signed in"
        );

        Ok(SessionGrant {
            account: account.view(),
            access_token,
            refresh_token: Some(refresh_token),
        })
    }
}

/// Hash of a random password, checked when the email is unknown
fn dummy_password_hash() -> Option<&'static AccountPassword> {
    static DUMMY: OnceLock<Option<AccountPassword>> = OnceLock::new();
    DUMMY
        .get_or_init(|| {
            let raw = RawPassword::for_sign_in(to_base64url(&random_bytes(24)));
            AccountPassword::from_raw(&raw, None)
                .inspect_err(|e| tracing::warn!(error = %e, "Dummy password hash unavailable"))
                .ok()
        })
        .as_ref()
}
