//! Shared fixtures for unit tests

use std::sync::{Arc, OnceLock};
use std::time::Duration;

use crate::application::config::AuthConfig;
use crate::application::token::TokenCodec;
use crate::domain::entity::account::Account;
use crate::domain::repository::AccountRepository;
use crate::domain::value_object::{
    account_password::{AccountPassword, RawPassword},
    display_name::DisplayName,
    email::Email,
    role::Role,
};
use crate::infra::memory::MemoryAccountRepository;

pub const PASSWORD: &str = "correct-pw";

pub fn config() -> AuthConfig {
    AuthConfig {
        token_secret: [9u8; 32],
        access_token_ttl: Duration::from_secs(60),
        refresh_token_ttl: Duration::from_secs(3600),
        cookie_secure: false,
        ..AuthConfig::default()
    }
}

pub fn codec(config: &AuthConfig) -> Arc<TokenCodec> {
    Arc::new(TokenCodec::new(config.token_secret))
}

/// Argon2 is slow in debug builds; hash the shared password once
pub fn password_hash() -> AccountPassword {
    static HASH: OnceLock<AccountPassword> = OnceLock::new();
    HASH.get_or_init(|| {
        AccountPassword::from_raw(&RawPassword::for_sign_in(PASSWORD.into()), None)
            .expect("hash test password")
    })
    .clone()
}

pub async fn seed(repo: &MemoryAccountRepository, email: &str, role: Role) -> Account {
    let account = Account::new(
        Email::new(email).expect("valid email"),
        DisplayName::new(email.split('@').next().unwrap_or(email)).expect("valid name"),
        password_hash(),
        role,
    );
    repo.create(&account).await.expect("seed account");
    account
}

pub async fn seed_inactive(repo: &MemoryAccountRepository, email: &str, role: Role) -> Account {
    let mut account = seed(repo, email, role).await;
    account.active = false;
    repo.update_profile(&account).await.expect("deactivate");
    account
}
