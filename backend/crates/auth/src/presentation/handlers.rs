//! HTTP Handlers
//!
//! Session endpoints. The refresh token only ever travels in an HttpOnly
//! cookie; the access token is returned in the body for the client to send
//! back as `Authorization: Bearer`.

use axum::Json;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Response};
use platform::bearer::extract_bearer;
use platform::cookie::extract_cookie;
use std::sync::Arc;

use crate::application::config::AuthConfig;
use crate::application::token::TokenCodec;
use crate::application::{
    CurrentAccount, CurrentSessionUseCase, RefreshSessionUseCase, SessionGrant, SignInInput,
    SignInUseCase, SignOutUseCase, SignUpInput, SignUpUseCase,
};
use crate::domain::repository::AccountRepository;
use crate::domain::value_object::role::Role;
use crate::error::AuthResult;
use crate::presentation::dto::{
    RevokedSessionsResponse, SessionResponse, SignInRequest, SignOutResponse, SignUpRequest,
    SignUpResponse,
};
use crate::presentation::middleware::RoleGate;

/// Shared state for auth handlers
pub struct AuthAppState<R>
where
    R: AccountRepository + Send + Sync + 'static,
{
    pub repo: Arc<R>,
    pub codec: Arc<TokenCodec>,
    pub config: Arc<AuthConfig>,
}

impl<R> Clone for AuthAppState<R>
where
    R: AccountRepository + Send + Sync + 'static,
{
    fn clone(&self) -> Self {
        Self {
            repo: self.repo.clone(),
            codec: self.codec.clone(),
            config: self.config.clone(),
        }
    }
}

impl<R> AuthAppState<R>
where
    R: AccountRepository + Send + Sync + 'static,
{
    pub fn new(repo: R, config: AuthConfig) -> Self {
        Self {
            repo: Arc::new(repo),
            codec: Arc::new(TokenCodec::new(config.token_secret)),
            config: Arc::new(config),
        }
    }

    /// Gate admitting only `allowed` roles, for use with `protect`
    pub fn gate(&self, allowed: &[Role]) -> RoleGate<R> {
        RoleGate::new(self.repo.clone(), self.codec.clone(), allowed)
    }

    fn refresh_token_from(&self, headers: &HeaderMap) -> Option<String> {
        extract_cookie(headers, &self.config.refresh_cookie_name)
    }
}

/// Session body, plus the refresh cookie when a new refresh token was issued
fn session_response(config: &AuthConfig, grant: &SessionGrant) -> Response {
    let body = Json(SessionResponse::from(grant));
    let no_store = (header::CACHE_CONTROL, "no-store".to_string());

    match &grant.refresh_token {
        Some(refresh) => {
            let cookie = config.refresh_cookie().build_set_cookie(&refresh.token);
            (StatusCode::OK, [no_store, (header::SET_COOKIE, cookie)], body).into_response()
        }
        None => (StatusCode::OK, [no_store], body).into_response(),
    }
}

// ============================================================================
// Sign Up
// ============================================================================

/// POST /api/auth/register
pub async fn sign_up<R>(
    State(state): State<AuthAppState<R>>,
    Json(req): Json<SignUpRequest>,
) -> AuthResult<impl IntoResponse>
where
    R: AccountRepository + Send + Sync + 'static,
{
    let use_case = SignUpUseCase::new(state.repo.clone(), state.config.clone());

    let account = use_case
        .execute(SignUpInput {
            email: req.email,
            password: req.password,
            name: req.name,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(SignUpResponse { account })))
}

// ============================================================================
// Sign In
// ============================================================================

/// POST /api/auth/login
pub async fn sign_in<R>(
    State(state): State<AuthAppState<R>>,
    Json(req): Json<SignInRequest>,
) -> AuthResult<Response>
where
    R: AccountRepository + Send + Sync + 'static,
{
    let use_case = SignInUseCase::new(
        state.repo.clone(),
        state.codec.clone(),
        state.config.clone(),
    );

    let grant = use_case
        .execute(SignInInput {
            email: req.email,
            password: req.password,
        })
        .await?;

    Ok(session_response(&state.config, &grant))
}

// ============================================================================
// Refresh
// ============================================================================

/// POST /api/auth/refresh
pub async fn refresh<R>(
    State(state): State<AuthAppState<R>>,
    headers: HeaderMap,
) -> AuthResult<Response>
where
    R: AccountRepository + Send + Sync + 'static,
{
    let refresh_token = state.refresh_token_from(&headers);

    let use_case = RefreshSessionUseCase::new(
        state.repo.clone(),
        state.codec.clone(),
        state.config.clone(),
    );
    let grant = use_case.execute(refresh_token.as_deref()).await?;

    Ok(session_response(&state.config, &grant))
}

// ============================================================================
// Who Am I
// ============================================================================

/// GET /api/auth/whoami
pub async fn who_am_i<R>(
    State(state): State<AuthAppState<R>>,
    headers: HeaderMap,
) -> AuthResult<Response>
where
    R: AccountRepository + Send + Sync + 'static,
{
    let access_token = extract_bearer(&headers);
    let refresh_token = state.refresh_token_from(&headers);

    let use_case = CurrentSessionUseCase::new(
        state.repo.clone(),
        state.codec.clone(),
        state.config.clone(),
    );
    let grant = use_case
        .execute(access_token.as_deref(), refresh_token.as_deref())
        .await?;

    Ok(session_response(&state.config, &grant))
}

// ============================================================================
// Sign Out
// ============================================================================

/// POST /api/auth/logout
///
/// Always answers 200 and clears the cookie, even if the server-side
/// removal fails.
pub async fn sign_out<R>(
    State(state): State<AuthAppState<R>>,
    headers: HeaderMap,
) -> impl IntoResponse
where
    R: AccountRepository + Send + Sync + 'static,
{
    let refresh_token = state.refresh_token_from(&headers);

    let use_case = SignOutUseCase::new(state.repo.clone(), state.codec.clone());
    if let Err(e) = use_case.execute(refresh_token.as_deref()).await {
        tracing::warn!(error = %e, "Failed to remove refresh token on sign-out");
    }

    let cookie = state.config.refresh_cookie().build_delete_cookie();

    (
        StatusCode::OK,
        [(header::SET_COOKIE, cookie)],
        Json(SignOutResponse { signed_out: true }),
    )
}

/// POST /api/auth/logout-all
pub async fn sign_out_everywhere<R>(
    State(state): State<AuthAppState<R>>,
    current: CurrentAccount,
) -> AuthResult<impl IntoResponse>
where
    R: AccountRepository + Send + Sync + 'static,
{
    let use_case = SignOutUseCase::new(state.repo.clone(), state.codec.clone());
    let revoked = use_case.execute_everywhere(&current.account_id).await?;

    let cookie = state.config.refresh_cookie().build_delete_cookie();

    Ok((
        StatusCode::OK,
        [(header::SET_COOKIE, cookie)],
        Json(RevokedSessionsResponse {
            revoked_sessions: revoked,
        }),
    ))
}
