use axum::{
    extract::{Extension, Json, State},
    http::{header, StatusCode},
    response::IntoResponse,
};

use super::{gate::SESSION_COOKIE, SharedState};
use crate::{
    error::{AppError, Result},
    models::{ActingUser, AuthRequest, UserDto},
};

/// Handler for login; the token is returned in the body and as the session cookie
pub async fn login(
    State(state): State<SharedState>,
    Json(request): Json<AuthRequest>,
) -> Result<impl IntoResponse> {
    let response = state
        .auth_service
        .login(&request.login, &request.password)
        .await?;

    let Some(token) = response.token.as_deref() else {
        return Err(AppError::Auth("Invalid login or password".into()));
    };
    let cookie = format!("{SESSION_COOKIE}={token}; HttpOnly; Path=/; SameSite=Lax");

    Ok((StatusCode::OK, [(header::SET_COOKIE, cookie)], Json(response)))
}

/// Handler for logout; clears the session cookie
pub async fn logout() -> impl IntoResponse {
    let cookie = format!("{SESSION_COOKIE}=; HttpOnly; Path=/; Max-Age=0");
    (StatusCode::NO_CONTENT, [(header::SET_COOKIE, cookie)])
}

/// The signed-in user's own record
pub async fn user_home(
    State(state): State<SharedState>,
    Extension(acting_user): Extension<ActingUser>,
) -> Result<impl IntoResponse> {
    let user = state
        .user_service
        .get_user_by_id(acting_user.id)
        .await?
        .ok_or(AppError::UserNotFound)?;

    Ok((StatusCode::OK, Json(UserDto::from(user))))
}
