//! Authorize Use Case
//!
//! Decides whether a request carrying an access token may reach an
//! endpoint restricted to a set of roles.
//!
//! The role check uses the role embedded in the token, so a role change
//! takes effect once the client refreshes (at most one access-token
//! lifetime later). Existence and the active flag are checked live, so
//! deleting or deactivating an account locks it out at once.

use std::sync::Arc;

use crate::application::token::{TokenCodec, TokenKind};
use crate::domain::privilege_guard::Actor;
use crate::domain::repository::AccountRepository;
use crate::domain::value_object::{account_id::AccountId, email::Email, role::Role};
use crate::error::{AuthError, AuthResult};

/// The authenticated account attached to a request
#[derive(Debug, Clone)]
pub struct CurrentAccount {
    pub account_id: AccountId,
    /// Role from the presented token
    pub role: Role,
    pub email: Email,
    pub display_name: String,
    /// Expiry of the presented access token, Unix milliseconds
    pub token_expires_at_ms: i64,
}

impl CurrentAccount {
    pub fn actor(&self) -> Actor {
        Actor {
            account_id: self.account_id,
            role: self.role,
        }
    }
}

/// Authorize use case
pub struct AuthorizeUseCase<R>
where
    R: AccountRepository,
{
    repo: Arc<R>,
    codec: Arc<TokenCodec>,
}

impl<R> AuthorizeUseCase<R>
where
    R: AccountRepository,
{
    pub fn new(repo: Arc<R>, codec: Arc<TokenCodec>) -> Self {
        Self { repo, codec }
    }

    pub async fn execute(
        &self,
        access_token: Option<&str>,
        allowed: &[Role],
    ) -> AuthResult<CurrentAccount> {
        let token = access_token.ok_or(AuthError::Unauthenticated)?;

        let claims = self
            .codec
            .verify(token, TokenKind::Access)
            .map_err(|e| {
                tracing::debug!(reason = %e, "Access token rejected");
                AuthError::Unauthenticated
            })?;

        let account = self
            .repo
            .find_by_id(&claims.sub)
            .await?
            .ok_or(AuthError::Unauthenticated)?;

        if !account.can_sign_in() {
            return Err(AuthError::Unauthenticated);
        }

        if !allowed.contains(&claims.role) {
            tracing::debug!(
                account_id = %account.account_id,
                role = %claims.role,
                "Role not allowed for endpoint"
            );
            return Err(AuthError::Forbidden);
        }

        Ok(CurrentAccount {
            account_id: account.account_id,
            role: claims.role,
            email: account.email,
            display_name: account.display_name.into_db(),
            token_expires_at_ms: claims.exp,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use crate::infra::memory::MemoryAccountRepository;
    use crate::test_support;

    fn setup() -> (MemoryAccountRepository, Arc<TokenCodec>, AuthorizeUseCase<MemoryAccountRepository>) {
        let repo = MemoryAccountRepository::new();
        let codec = test_support::codec(&test_support::config());
        let uc = AuthorizeUseCase::new(Arc::new(repo.clone()), codec.clone());
        (repo, codec, uc)
    }

    fn access(codec: &TokenCodec, id: AccountId, role: Role) -> String {
        codec
            .issue(id, role, TokenKind::Access, Duration::from_secs(60))
            .unwrap()
            .token
    }

    #[tokio::test]
    async fn test_allowed_role_passes() {
        let (repo, codec, uc) = setup();
        let admin = test_support::seed(&repo, "admin@x.io", Role::Admin).await;
        let token = access(&codec, admin.account_id, Role::Admin);

        let current = uc.execute(Some(&token), Role::ADMINS).await.unwrap();
        assert_eq!(current.account_id, admin.account_id);
        assert_eq!(current.role, Role::Admin);
    }

    #[tokio::test]
    async fn test_disallowed_role_is_forbidden() {
        let (repo, codec, uc) = setup();
        let user = test_support::seed(&repo, "u@x.io", Role::User).await;
        let token = access(&codec, user.account_id, Role::User);

        assert!(matches!(
            uc.execute(Some(&token), Role::ADMINS).await,
            Err(AuthError::Forbidden)
        ));
    }

    #[tokio::test]
    async fn test_missing_invalid_or_refresh_token_is_unauthenticated() {
        let (repo, codec, uc) = setup();
        let user = test_support::seed(&repo, "u@x.io", Role::User).await;
        let refresh = codec
            .issue(user.account_id, Role::User, TokenKind::Refresh, Duration::from_secs(60))
            .unwrap()
            .token;

        for token in [None, Some("garbage"), Some(refresh.as_str())] {
            assert!(matches!(
                uc.execute(token, Role::ALL).await,
                Err(AuthError::Unauthenticated)
            ));
        }
    }

    #[tokio::test]
    async fn test_deleted_or_inactive_account_is_unauthenticated() {
        let (repo, codec, uc) = setup();
        let gone = AccountId::new();
        let token = access(&codec, gone, Role::Admin);
        assert!(matches!(
            uc.execute(Some(&token), Role::ALL).await,
            Err(AuthError::Unauthenticated)
        ));

        let inactive = test_support::seed_inactive(&repo, "off@x.io", Role::User).await;
        let token = access(&codec, inactive.account_id, Role::User);
        assert!(matches!(
            uc.execute(Some(&token), Role::ALL).await,
            Err(AuthError::Unauthenticated)
        ));
    }

    #[tokio::test]
    async fn test_role_comes_from_token_until_refresh() {
        let (repo, codec, uc) = setup();
        let mut account = test_support::seed(&repo, "a@x.io", Role::Admin).await;
        let token = access(&codec, account.account_id, Role::Admin);

        account.role = Role::User;
        repo.update_profile(&account).await.unwrap();

        let current = uc.execute(Some(&token), Role::ADMINS).await.unwrap();
        assert_eq!(current.role, Role::Admin);
    }
}
