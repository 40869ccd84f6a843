//! Manage Accounts Use Case
//!
//! Administrative listing, lookup, update, deletion and session revocation.
//! Every mutation goes through `privilege_guard` before touching the store.

use std::sync::Arc;

use crate::application::config::AuthConfig;
use crate::domain::entity::account::{Account, AccountPatch, AccountView};
use crate::domain::privilege_guard::{self, Actor};
use crate::domain::repository::{AccountQuery, AccountRepository};
use crate::domain::value_object::{
    account_id::AccountId,
    account_password::{AccountPassword, RawPassword},
    display_name::DisplayName,
    email::Email,
    role::Role,
};
use crate::error::{AuthError, AuthResult};

pub const DEFAULT_PER_PAGE: u32 = 20;
pub const MAX_PER_PAGE: u32 = 100;

/// Listing parameters as received from the caller
#[derive(Debug, Default)]
pub struct ListAccountsInput {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
    pub search: Option<String>,
    pub role: Option<Role>,
}

#[derive(Debug)]
pub struct AccountList {
    pub items: Vec<AccountView>,
    pub total: u64,
    pub page: u32,
    pub per_page: u32,
}

/// Requested changes; absent fields are left as they are
#[derive(Debug, Default)]
pub struct UpdateAccountInput {
    pub name: Option<String>,
    pub email: Option<String>,
    pub role: Option<Role>,
    pub active: Option<bool>,
    pub password: Option<String>,
}

/// Manage accounts use case
pub struct ManageAccountsUseCase<R>
where
    R: AccountRepository,
{
    repo: Arc<R>,
    config: Arc<AuthConfig>,
}

impl<R> ManageAccountsUseCase<R>
where
    R: AccountRepository,
{
    pub fn new(repo: Arc<R>, config: Arc<AuthConfig>) -> Self {
        Self { repo, config }
    }

    /// Regular and admin accounts; superadmins never appear here
    pub async fn list(&self, input: ListAccountsInput) -> AuthResult<AccountList> {
        let roles = privilege_guard::listable_roles(input.role);
        self.query(roles, input).await
    }

    /// Superadmin accounts only; the route is restricted to superadmins
    pub async fn list_superadmins(&self, input: ListAccountsInput) -> AuthResult<AccountList> {
        self.query(vec![Role::SuperAdmin], input).await
    }

    pub async fn get(&self, actor: &Actor, account_id: &AccountId) -> AuthResult<AccountView> {
        let account = self.find(account_id).await?;
        if !privilege_guard::is_visible_to(actor, &account) {
            return Err(AuthError::AccountNotFound);
        }
        Ok(account.view())
    }

    pub async fn update(
        &self,
        actor: &Actor,
        account_id: &AccountId,
        input: UpdateAccountInput,
    ) -> AuthResult<AccountView> {
        let mut account = self.find(account_id).await?;
        let patch = self.build_patch(input)?;

        privilege_guard::check_update(actor, &account, &patch)?;

        if let Some(email) = &patch.email {
            if email != &account.email && self.repo.exists_by_email(email).await? {
                return Err(AuthError::EmailTaken);
            }
        }

        // Both leave existing refresh tokens untrustworthy
        let revoke_sessions =
            (patch.deactivates() && account.active) || patch.password_hash.is_some();
        patch.apply(&mut account);
        self.repo.update_profile(&account).await?;

        if revoke_sessions {
            self.repo.clear_refresh_tokens(&account.account_id).await?;
        }

        tracing::info!(
            actor_id = %actor.account_id,
            account_id = %account.account_id,
            "Account updated"
        );

        Ok(account.view())
    }

    pub async fn delete(&self, actor: &Actor, account_id: &AccountId) -> AuthResult<()> {
        let account = self.find(account_id).await?;
        privilege_guard::check_delete(actor, &account)?;

        if !self.repo.delete(account_id).await? {
            return Err(AuthError::AccountNotFound);
        }

        tracing::info!(
            actor_id = %actor.account_id,
            account_id = %account_id,
            "Account deleted"
        );

        Ok(())
    }

    /// Sign the account out on every device
    pub async fn revoke_sessions(&self, actor: &Actor, account_id: &AccountId) -> AuthResult<u64> {
        let account = self.find(account_id).await?;
        privilege_guard::check_revoke_sessions(&account)?;

        let revoked = self.repo.clear_refresh_tokens(account_id).await?;

        tracing::info!(
            actor_id = %actor.account_id,
            account_id = %account_id,
            revoked,
            "Account sessions revoked"
        );

        Ok(revoked)
    }

    async fn find(&self, account_id: &AccountId) -> AuthResult<Account> {
        self.repo
            .find_by_id(account_id)
            .await?
            .ok_or(AuthError::AccountNotFound)
    }

    async fn query(&self, roles: Vec<Role>, input: ListAccountsInput) -> AuthResult<AccountList> {
        let page = input.page.unwrap_or(1).max(1);
        let per_page = input
            .per_page
            .unwrap_or(DEFAULT_PER_PAGE)
            .clamp(1, MAX_PER_PAGE);

        if roles.is_empty() {
            return Ok(AccountList {
                items: Vec::new(),
                total: 0,
                page,
                per_page,
            });
        }

        let result = self
            .repo
            .list(&AccountQuery {
                roles,
                search: input.search,
                page,
                per_page,
            })
            .await?;

        Ok(AccountList {
            items: result.items.iter().map(Account::view).collect(),
            total: result.total,
            page,
            per_page,
        })
    }

    fn build_patch(&self, input: UpdateAccountInput) -> AuthResult<AccountPatch> {
        let password_hash = match input.password {
            Some(raw) => {
                let raw = RawPassword::new(raw)?;
                Some(AccountPassword::from_raw(&raw, self.config.pepper())?)
            }
            None => None,
        };

        Ok(AccountPatch {
            display_name: input.name.map(DisplayName::new).transpose()?,
            email: input.email.map(Email::new).transpose()?,
            role: input.role,
            active: input.active,
            password_hash,
        })
    }
}
