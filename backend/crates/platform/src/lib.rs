//! Platform Crate - Technical Infrastructure
//!
//! Shared technical foundations with no business meaning:
//! - Cryptographic utilities (random bytes, HMAC-SHA256, base64url)
//! - Password hashing (Argon2id, NIST SP 800-63B length policy)
//! - Cookie parsing and `Set-Cookie` building
//! - Bearer credential extraction

pub mod bearer;
pub mod cookie;
pub mod crypto;
pub mod password;
