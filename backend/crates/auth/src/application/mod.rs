//! Application Layer
//!
//! Use cases and application services.

pub mod authorize;
pub mod config;
pub mod current_session;
pub mod manage_accounts;
pub mod refresh_session;
pub mod sign_in;
pub mod sign_out;
pub mod sign_up;
pub mod token;

// Re-exports
pub use authorize::{AuthorizeUseCase, CurrentAccount};
pub use config::AuthConfig;
pub use current_session::CurrentSessionUseCase;
pub use manage_accounts::{
    AccountList, ListAccountsInput, ManageAccountsUseCase, UpdateAccountInput,
};
pub use refresh_session::RefreshSessionUseCase;
pub use sign_in::{SessionGrant, SignInInput, SignInUseCase};
pub use sign_out::SignOutUseCase;
pub use sign_up::{SignUpInput, SignUpUseCase};
pub use token::{IssuedToken, TokenClaims, TokenCodec, TokenEncodeError, TokenError, TokenKind};
