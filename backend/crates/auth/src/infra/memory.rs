//! In-Memory Account Repository
//!
//! Process-local store for tests and local development. Every operation
//! takes the lock once, so the refresh-token updates are as atomic as the
//! PostgreSQL ones.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::domain::entity::account::Account;
use crate::domain::repository::{AccountPage, AccountQuery, AccountRepository};
use crate::domain::value_object::{account_id::AccountId, email::Email};
use crate::error::{AuthError, AuthResult};

type AccountMap = Arc<RwLock<HashMap<AccountId, Account>>>;

/// Thread-safe account store kept in process memory
#[derive(Clone, Debug, Default)]
pub struct MemoryAccountRepository(AccountMap);

impl MemoryAccountRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn email_in_use(map: &HashMap<AccountId, Account>, email: &Email, except: &AccountId) -> bool {
        map.values()
            .any(|a| &a.email == email && &a.account_id != except)
    }

    fn matches_search(account: &Account, needle: &str) -> bool {
        account.email.as_str().contains(needle)
            || account.display_name.as_str().to_lowercase().contains(needle)
    }
}

impl AccountRepository for MemoryAccountRepository {
    async fn create(&self, account: &Account) -> AuthResult<()> {
        let mut guard = self.0.write();
        if Self::email_in_use(&guard, &account.email, &account.account_id) {
            return Err(AuthError::EmailTaken);
        }
        if guard.contains_key(&account.account_id) {
            return Err(AuthError::Internal("Duplicate account id".into()));
        }
        guard.insert(account.account_id, account.clone());
        Ok(())
    }

    async fn find_by_id(&self, account_id: &AccountId) -> AuthResult<Option<Account>> {
        Ok(self.0.read().get(account_id).cloned())
    }

    async fn find_by_email(&self, email: &Email) -> AuthResult<Option<Account>> {
        Ok(self.0.read().values().find(|a| &a.email == email).cloned())
    }

    async fn exists_by_email(&self, email: &Email) -> AuthResult<bool> {
        Ok(self.0.read().values().any(|a| &a.email == email))
    }

    async fn update_profile(&self, account: &Account) -> AuthResult<()> {
        let mut guard = self.0.write();
        if Self::email_in_use(&guard, &account.email, &account.account_id) {
            return Err(AuthError::EmailTaken);
        }
        let stored = guard
            .get_mut(&account.account_id)
            .ok_or(AuthError::AccountNotFound)?;

        stored.email = account.email.clone();
        stored.display_name = account.display_name.clone();
        stored.password_hash = account.password_hash.clone();
        stored.role = account.role;
        stored.active = account.active;
        stored.updated_at = account.updated_at;
        Ok(())
    }

    async fn delete(&self, account_id: &AccountId) -> AuthResult<bool> {
        Ok(self.0.write().remove(account_id).is_some())
    }

    async fn push_refresh_token(
        &self,
        account_id: &AccountId,
        token: &str,
        retire: &[String],
    ) -> AuthResult<bool> {
        Ok(match self.0.write().get_mut(account_id) {
            Some(account) => {
                account.refresh_tokens.retain(|held| !retire.contains(held));
                account.refresh_tokens.push(token.to_string());
                true
            }
            None => false,
        })
    }

    async fn remove_refresh_token(&self, account_id: &AccountId, token: &str) -> AuthResult<bool> {
        let mut guard = self.0.write();
        let Some(account) = guard.get_mut(account_id) else {
            return Ok(false);
        };
        let before = account.refresh_tokens.len();
        account.refresh_tokens.retain(|held| held != token);
        Ok(account.refresh_tokens.len() != before)
    }

    async fn replace_refresh_token(
        &self,
        account_id: &AccountId,
        old: &str,
        new: &str,
    ) -> AuthResult<bool> {
        let mut guard = self.0.write();
        let Some(account) = guard.get_mut(account_id) else {
            return Ok(false);
        };
        match account.refresh_tokens.iter_mut().find(|held| held.as_str() == old) {
            Some(slot) => {
                *slot = new.to_string();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn clear_refresh_tokens(&self, account_id: &AccountId) -> AuthResult<u64> {
        Ok(self
            .0
            .write()
            .get_mut(account_id)
            .map(|account| std::mem::take(&mut account.refresh_tokens).len() as u64)
            .unwrap_or(0))
    }

    async fn list(&self, query: &AccountQuery) -> AuthResult<AccountPage> {
        let needle = query
            .search
            .as_deref()
            .map(|s| s.trim().to_lowercase())
            .filter(|s| !s.is_empty());

        let mut matched: Vec<Account> = self
            .0
            .read()
            .values()
            .filter(|a| query.roles.contains(&a.role))
            .filter(|a| needle.as_deref().is_none_or(|n| Self::matches_search(a, n)))
            .cloned()
            .collect();

        matched.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| a.email.as_str().cmp(b.email.as_str()))
        });

        let total = matched.len() as u64;
        let items = matched
            .into_iter()
            .skip(usize::try_from(query.offset()).unwrap_or(usize::MAX))
            .take(query.per_page as usize)
            .collect();

        Ok(AccountPage { items, total })
    }
}
