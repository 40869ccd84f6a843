//! Domain Layer
//!
//! Contains entities, value objects, privilege rules and repository traits.

pub mod entity;
pub mod privilege_guard;
pub mod repository;
pub mod value_object;

// Re-exports
pub use entity::account::{Account, AccountPatch, AccountView};
pub use repository::{AccountPage, AccountQuery, AccountRepository};
