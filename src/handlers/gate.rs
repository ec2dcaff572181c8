//! Session gate: resolves the caller from the session token and enforces
//! the admin-only area.

use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};
use tracing::warn;

use super::SharedState;
use crate::{
    error::{AppError, Result},
    models::ActingUser,
};

pub const SESSION_COOKIE: &str = "session";

/// Decode the session token into an [`ActingUser`] request extension.
pub async fn require_auth(State(state): State<SharedState>, mut req: Request, next: Next) -> Result<Response> {
    let token = session_token(&req).ok_or_else(|| AppError::Auth("Login required".into()))?;

    let acting_user = state.auth_service.decode(&token).inspect_err(|e| {
        warn!(path = %req.uri().path(), error = %e, "Rejected session token");
    })?;

    req.extensions_mut().insert(acting_user);
    Ok(next.run(req).await)
}

/// Must run inside [`require_auth`].
pub async fn require_admin(req: Request, next: Next) -> Result<Response> {
    let is_admin = req
        .extensions()
        .get::<ActingUser>()
        .is_some_and(ActingUser::is_admin);

    if !is_admin {
        return Err(AppError::Forbidden("Admin role required".into()));
    }
    Ok(next.run(req).await)
}

/// Token from `Authorization: Bearer ...`, falling back to the session cookie.
fn session_token(req: &Request) -> Option<String> {
    let headers = req.headers();

    if let Some(token) = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
    {
        return Some(token.trim().to_string());
    }

    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .map(|(_, value)| value.to_string())
        .filter(|value| !value.is_empty())
}
