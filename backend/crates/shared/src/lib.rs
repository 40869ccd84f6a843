//! Shared Kernel
//!
//! Vocabulary shared by every backend crate:
//! - The unified [`error::app_error::AppError`] and its result alias
//! - [`error::kind::ErrorKind`], the HTTP-facing error classification
//! - Typed identifiers ([`id::Id`])
//!
//! Only things whose meaning is stable across all domains belong here.

pub mod error {
    pub mod app_error;
    pub mod conversions;
    pub mod kind;
}
pub mod id;
