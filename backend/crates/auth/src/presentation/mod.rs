//! Presentation Layer
//!
//! HTTP handlers, DTOs, middleware, and routers.

pub mod account_handlers;
pub mod dto;
pub mod handlers;
pub mod middleware;
pub mod router;
