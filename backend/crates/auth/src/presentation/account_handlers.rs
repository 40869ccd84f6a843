//! Account Administration Handlers
//!
//! Mounted behind an admin-only gate; the superadmin listing has its own
//! superadmin-only gate.

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;

use crate::application::{CurrentAccount, ListAccountsInput, ManageAccountsUseCase};
use crate::domain::entity::account::AccountView;
use crate::domain::repository::AccountRepository;
use crate::domain::value_object::account_id::AccountId;
use crate::error::{AuthError, AuthResult};
use crate::presentation::dto::{
    AccountListResponse, ListAccountsQuery, RevokedSessionsResponse, UpdateAccountRequest,
};
use crate::presentation::handlers::AuthAppState;

fn use_case<R>(state: &AuthAppState<R>) -> ManageAccountsUseCase<R>
where
    R: AccountRepository + Send + Sync + 'static,
{
    ManageAccountsUseCase::new(state.repo.clone(), state.config.clone())
}

fn parse_account_id(raw: &str) -> AuthResult<AccountId> {
    raw.parse()
        .map_err(|_| AuthError::Validation("Invalid account id".into()))
}

fn list_input(query: ListAccountsQuery) -> ListAccountsInput {
    ListAccountsInput {
        page: query.page,
        per_page: query.per_page,
        search: query.q,
        role: query.role,
    }
}

/// GET /api/users
pub async fn list_accounts<R>(
    State(state): State<AuthAppState<R>>,
    Query(query): Query<ListAccountsQuery>,
) -> AuthResult<Json<AccountListResponse>>
where
    R: AccountRepository + Send + Sync + 'static,
{
    let list = use_case(&state).list(list_input(query)).await?;
    Ok(Json(list.into()))
}

/// GET /api/users/superadmins
pub async fn list_superadmins<R>(
    State(state): State<AuthAppState<R>>,
    Query(query): Query<ListAccountsQuery>,
) -> AuthResult<Json<AccountListResponse>>
where
    R: AccountRepository + Send + Sync + 'static,
{
    let list = use_case(&state).list_superadmins(list_input(query)).await?;
    Ok(Json(list.into()))
}

/// GET /api/users/{id}
pub async fn get_account<R>(
    State(state): State<AuthAppState<R>>,
    current: CurrentAccount,
    Path(id): Path<String>,
) -> AuthResult<Json<AccountView>>
where
    R: AccountRepository + Send + Sync + 'static,
{
    let account_id = parse_account_id(&id)?;
    let view = use_case(&state).get(&current.actor(), &account_id).await?;
    Ok(Json(view))
}

/// PATCH /api/users/{id}
pub async fn update_account<R>(
    State(state): State<AuthAppState<R>>,
    current: CurrentAccount,
    Path(id): Path<String>,
    Json(req): Json<UpdateAccountRequest>,
) -> AuthResult<Json<AccountView>>
where
    R: AccountRepository + Send + Sync + 'static,
{
    let account_id = parse_account_id(&id)?;
    let view = use_case(&state)
        .update(&current.actor(), &account_id, req.into())
        .await?;
    Ok(Json(view))
}

/// DELETE /api/users/{id}
pub async fn delete_account<R>(
    State(state): State<AuthAppState<R>>,
    current: CurrentAccount,
    Path(id): Path<String>,
) -> AuthResult<impl IntoResponse>
where
    R: AccountRepository + Send + Sync + 'static,
{
    let account_id = parse_account_id(&id)?;
    use_case(&state).delete(&current.actor(), &account_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /api/users/{id}/sessions
pub async fn revoke_account_sessions<R>(
    State(state): State<AuthAppState<R>>,
    current: CurrentAccount,
    Path(id): Path<String>,
) -> AuthResult<Json<RevokedSessionsResponse>>
where
    R: AccountRepository + Send + Sync + 'static,
{
    let account_id = parse_account_id(&id)?;
    let revoked = use_case(&state)
        .revoke_sessions(&current.actor(), &account_id)
        .await?;
    Ok(Json(RevokedSessionsResponse {
        revoked_sessions: revoked,
    }))
}
