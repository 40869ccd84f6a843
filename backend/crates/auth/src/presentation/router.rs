//! Auth Routers
//!
//! `auth_router` serves the session endpoints, `accounts_router` the
//! administrative ones. Both share one `AuthAppState` so they see the same
//! store and signing key.

use axum::{
    Router,
    routing::{delete, get, post},
};

use crate::domain::repository::AccountRepository;
use crate::domain::value_object::role::Role;
use crate::presentation::account_handlers;
use crate::presentation::handlers::{self, AuthAppState};
use crate::presentation::middleware::protect;

/// Session endpoints, usually nested under `/api/auth`
pub fn auth_router<R>(state: AuthAppState<R>) -> Router
where
    R: AccountRepository + Send + Sync + 'static,
{
    let signed_in = protect(
        Router::new().route("/logout-all", post(handlers::sign_out_everywhere::<R>)),
        state.gate(Role::ALL),
    );

    Router::new()
        .route("/register", post(handlers::sign_up::<R>))
        .route("/login", post(handlers::sign_in::<R>))
        .route("/refresh", post(handlers::refresh::<R>))
        .route("/logout", post(handlers::sign_out::<R>))
        .route("/whoami", get(handlers::who_am_i::<R>))
        .merge(signed_in)
        .with_state(state)
}

/// Account administration, usually nested under `/api/users`
pub fn accounts_router<R>(state: AuthAppState<R>) -> Router
where
    R: AccountRepository + Send + Sync + 'static,
{
    let superadmin_only = protect(
        Router::new().route(
            "/superadmins",
            get(account_handlers::list_superadmins::<R>),
        ),
        state.gate(Role::SUPERADMIN_ONLY),
    );

    let admins = protect(
        Router::new()
            .route("/", get(account_handlers::list_accounts::<R>))
            .route(
                "/{id}",
                get(account_handlers::get_account::<R>)
                    .patch(account_handlers::update_account::<R>)
                    .delete(account_handlers::delete_account::<R>),
            )
            .route(
                "/{id}/sessions",
                delete(account_handlers::revoke_account_sessions::<R>),
            ),
        state.gate(Role::ADMINS),
    );

    Router::new()
        .merge(superadmin_only)
        .merge(admins)
        .with_state(state)
}
