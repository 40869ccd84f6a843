//! Account ID Value Object

use kernel::id::{Id, markers};

/// Internal account identifier (UUID v4)
///
/// Used as the `sub` claim of every token and as the key of the
/// account store.
pub type AccountId = Id<markers::Account>;
