//! Session Client
//!
//! Client-side counterpart of the `auth` crate's session endpoints. A
//! [`SessionManager`] holds the signed-in account and its access token in
//! memory, renews the token shortly before it expires, and forgets
//! everything on sign-out or on a failed renewal.
//!
//! Each manager is an ordinary value; several can coexist in one process.

pub mod config;
pub mod error;
pub mod manager;
pub mod model;
pub mod transport;

pub use config::SessionClientConfig;
pub use error::{SessionClientError, SessionClientResult};
pub use manager::SessionManager;
pub use model::{AccountSummary, SessionGrant};
pub use transport::{HttpTransport, LocalSessionTransport, SessionTransport};
