//! Auth (Authentication & Authorization) Backend Module
//!
//! Clean Architecture structure:
//! - `domain/` - Account entity, value objects, privilege rules, repository trait
//! - `application/` - Token codec and use cases
//! - `infra/` - PostgreSQL and in-memory account stores
//! - `presentation/` - HTTP handlers, DTOs, role-gate middleware, routers
//!
//! ## Session Model
//! - Short-lived signed access tokens, sent as `Authorization: Bearer`
//! - Long-lived refresh tokens in an HttpOnly cookie, one per device,
//!   tracked on the account so they can be revoked
//! - Roles: user, admin, superadmin; endpoints declare the roles they admit
//!
//! ## Security Model
//! - Passwords hashed with Argon2id (NIST SP 800-63B compliant)
//! - Tokens signed with HMAC-SHA256, expiry checked with no leeway
//! - Sign-in failures are indistinguishable to the client
//! - Superadmin accounts cannot be demoted, deleted or listed by admins

pub mod application;
pub mod domain;
pub mod error;
pub mod infra;
pub mod presentation;

#[cfg(test)]
mod test_support;

// Re-exports for convenience
pub use application::config::AuthConfig;
pub use application::{CurrentAccount, TokenCodec};
pub use domain::repository::AccountRepository;
pub use domain::value_object::role::Role;
pub use error::{AuthError, AuthResult};
pub use infra::{MemoryAccountRepository, PgAccountRepository};
pub use presentation::handlers::AuthAppState;
pub use presentation::middleware::{RoleGate, protect};
pub use presentation::router::{accounts_router, auth_router};

// Re-export kernel error types for unified error handling
pub use kernel::error::{
    app_error::{AppError, AppResult},
    kind::ErrorKind,
};
