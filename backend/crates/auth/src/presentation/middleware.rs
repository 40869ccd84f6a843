//! Auth Middleware
//!
//! Role-gated access for protected routes. Each protected router declares
//! the roles it admits; the gate verifies the bearer access token, checks
//! the account is still there and active, and attaches the
//! [`CurrentAccount`] to the request for handlers to extract.

use std::sync::Arc;

use axum::Router;
use axum::extract::{FromRequestParts, Request, State};
use axum::http::request::Parts;
use axum::middleware::{self, Next};
use axum::response::Response;
use platform::bearer::extract_bearer;

use crate::application::token::TokenCodec;
use crate::application::{AuthorizeUseCase, CurrentAccount};
use crate::domain::repository::AccountRepository;
use crate::domain::value_object::role::Role;
use crate::error::AuthError;

/// Middleware state: where to look accounts up and which roles may pass
pub struct RoleGate<R>
where
    R: AccountRepository + Send + Sync + 'static,
{
    pub repo: Arc<R>,
    pub codec: Arc<TokenCodec>,
    pub allowed: Arc<[Role]>,
}

impl<R> Clone for RoleGate<R>
where
    R: AccountRepository + Send + Sync + 'static,
{
    fn clone(&self) -> Self {
        Self {
            repo: self.repo.clone(),
            codec: self.codec.clone(),
            allowed: self.allowed.clone(),
        }
    }
}

impl<R> RoleGate<R>
where
    R: AccountRepository + Send + Sync + 'static,
{
    pub fn new(repo: Arc<R>, codec: Arc<TokenCodec>, allowed: &[Role]) -> Self {
        Self {
            repo,
            codec,
            allowed: Arc::from(allowed),
        }
    }
}

/// Middleware that requires a valid access token with an allowed role
pub async fn require_roles<R>(
    State(gate): State<RoleGate<R>>,
    mut req: Request,
    next: Next,
) -> Result<Response, AuthError>
where
    R: AccountRepository + Send + Sync + 'static,
{
    let token = extract_bearer(req.headers());

    let use_case = AuthorizeUseCase::new(gate.repo.clone(), gate.codec.clone());
    let current = use_case.execute(token.as_deref(), &gate.allowed).await?;

    req.extensions_mut().insert(current);

    Ok(next.run(req).await)
}

/// Put every route of `router` behind `gate`
///
/// Uses `route_layer`, so unknown paths still answer 404 rather than 401.
pub fn protect<S, R>(router: Router<S>, gate: RoleGate<R>) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
    R: AccountRepository + Send + Sync + 'static,
{
    router.route_layer(middleware::from_fn_with_state(gate, require_roles::<R>))
}

impl<S> FromRequestParts<S> for CurrentAccount
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<CurrentAccount>()
            .cloned()
            .ok_or(AuthError::Unauthenticated)
    }
}
