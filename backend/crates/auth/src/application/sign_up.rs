//! Sign Up Use Case
//!
//! Creates regular accounts. Superadmin accounts are never created here;
//! they come from `ensure_superadmin` at process startup.

use std::sync::Arc;

use crate::application::config::AuthConfig;
use crate::domain::entity::account::{Account, AccountView};
use crate::domain::repository::AccountRepository;
use crate::domain::value_object::{
    account_password::{AccountPassword, RawPassword},
    display_name::DisplayName,
    email::Email,
    role::Role,
};
use crate::error::{AuthError, AuthResult};

/// Sign up input
pub struct SignUpInput {
    pub email: String,
    pub password: String,
    pub name: String,
}

/// Sign up use case
pub struct SignUpUseCase<R>
where
    R: AccountRepository,
{
    repo: Arc<R>,
    config: Arc<AuthConfig>,
}

impl<R> SignUpUseCase<R>
where
    R: AccountRepository,
{
    pub fn new(repo: Arc<R>, config: Arc<AuthConfig>) -> Self {
        Self { repo, config }
    }

    pub async fn execute(&self, input: SignUpInput) -> AuthResult<AccountView> {
        let account = self.build(input, Role::User)?;

        if self.repo.exists_by_email(&account.email).await? {
            return Err(AuthError::EmailTaken);
        }

        self.repo.create(&account).await?;

        tracing::info!(account_id = %account.account_id, "Account signed up");

        Ok(account.view())
    }

    /// Create the superadmin account if no account uses `email` yet
    ///
    /// Returns true when an account was created. An existing account with
    /// that email is left untouched, whatever its role.
    pub async fn ensure_superadmin(&self, input: SignUpInput) -> AuthResult<bool> {
        let account = self.build(input, Role::SuperAdmin)?;

        if let Some(existing) = self.repo.find_by_email(&account.email).await? {
            if !existing.role.is_super_admin() {
                tracing::warn!(
                    account_id = %existing.account_id,
                    role = %existing.role,
                    "Superadmin email belongs to a non-superadmin account"
                );
            }
            return Ok(false);
        }

        self.repo.create(&account).await?;

        tracing::info!(account_id = %account.account_id, "Superadmin account created");

        Ok(true)
    }

    fn build(&self, input: SignUpInput, role: Role) -> AuthResult<Account> {
        let email = Email::new(&input.email)?;
        let display_name = DisplayName::new(&input.name)?;
        let raw_password = RawPassword::new(input.password)?;
        let password_hash = AccountPassword::from_raw(&raw_password, self.config.pepper())?;

        Ok(Account::new(email, display_name, password_hash, role))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::memory::MemoryAccountRepository;
    use crate::test_support;

    fn use_case(repo: &MemoryAccountRepository) -> SignUpUseCase<MemoryAccountRepository> {
        SignUpUseCase::new(Arc::new(repo.clone()), Arc::new(test_support::config()))
    }

    fn input(email: &str) -> SignUpInput {
        SignUpInput {
            email: email.into(),
            password: "correct-pw".into(),
            name: "Ada".into(),
        }
    }

    #[tokio::test]
    async fn test_sign_up_creates_active_user() {
        let repo = MemoryAccountRepository::new();
        let view = use_case(&repo).execute(input("Ada@X.io")).await.unwrap();

        assert_eq!(view.email, "ada@x.io");
        assert_eq!(view.role, Role::User);
        assert!(view.active);
    }

    #[tokio::test]
    async fn test_sign_up_rejects_duplicate_and_weak_input() {
        let repo = MemoryAccountRepository::new();
        let uc = use_case(&repo);
        uc.execute(input("ada@x.io")).await.unwrap();

        assert!(matches!(
            uc.execute(input("ADA@x.io")).await,
            Err(AuthError::EmailTaken)
        ));

        let weak = SignUpInput {
            password: "short".into(),
            ..input("b@x.io")
        };
        assert!(matches!(uc.execute(weak).await, Err(AuthError::Validation(_))));
    }

    #[tokio::test]
    async fn test_ensure_superadmin_is_idempotent() {
        let repo = MemoryAccountRepository::new();
        let uc = use_case(&repo);

        assert!(uc.ensure_superadmin(input("root@x.io")).await.unwrap());
        assert!(!uc.ensure_superadmin(input("root@x.io")).await.unwrap());

        let email = Email::new("root@x.io").unwrap();
        let root = repo.find_by_email(&email).await.unwrap().unwrap();
        assert_eq!(root.role, Role::SuperAdmin);
    }
}
