//! Infrastructure Layer
//!
//! Account store implementations.

pub mod memory;
pub mod postgres;

pub use memory::MemoryAccountRepository;
pub use postgres::PgAccountRepository;
