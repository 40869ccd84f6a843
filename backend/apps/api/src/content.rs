//! Content Routes
//!
//! Sample content endpoints. Every route here sits behind a role gate;
//! there is no route without one.

use auth::{AccountRepository, AuthAppState, CurrentAccount, Role, protect};
use axum::{
    Json, Router,
    routing::{get, post},
};
use serde::Serialize;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PingResponse {
    message: &'static str,
    account_id: String,
    role: Role,
}

async fn ping(current: CurrentAccount) -> Json<PingResponse> {
    Json(PingResponse {
        message: "pong",
        account_id: current.account_id.to_string(),
        role: current.role,
    })
}

async fn admin_ping(current: CurrentAccount) -> Json<PingResponse> {
    tracing::info!(account_id = %current.account_id, "Admin ping");
    Json(PingResponse {
        message: "admin pong",
        account_id: current.account_id.to_string(),
        role: current.role,
    })
}

/// Content endpoints, nested under `/api/content`
pub fn content_router<R>(state: &AuthAppState<R>) -> Router
where
    R: AccountRepository + Send + Sync + 'static,
{
    let readers = protect(
        Router::new().route("/ping", get(ping)),
        state.gate(Role::ALL),
    );
    let editors = protect(
        Router::new().route("/admin-ping", post(admin_ping)),
        state.gate(Role::ADMINS),
    );

    readers.merge(editors)
}
