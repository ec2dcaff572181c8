use axum::{
    extract::{Extension, Json, Path, State},
    http::StatusCode,
    response::IntoResponse,
};

use super::SharedState;
use crate::{
    error::{AppError, Result},
    models::{ActingUser, Role, UserDto, UserForm},
};

/// Get all users handler
pub async fn get_all_users(State(state): State<SharedState>) -> Result<impl IntoResponse> {
    let users = state.user_service.get_all_users().await?;
    let user_dtos: Vec<UserDto> = users.into_iter().map(UserDto::from).collect();
    Ok((StatusCode::OK, Json(user_dtos)))
}

/// Get user by ID handler
pub async fn get_user_by_id(
    State(state): State<SharedState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse> {
    let user = state
        .user_service
        .get_user_by_id(id)
        .await?
        .ok_or(AppError::UserNotFound)?;
    Ok((StatusCode::OK, Json(UserDto::from(user))))
}

/// Create user handler
pub async fn create_user(
    State(state): State<SharedState>,
    Json(form): Json<UserForm>,
) -> Result<impl IntoResponse> {
    let role = resolve_role(&state, form.role_id).await?;
    let mut user = form.into_user(None, role);

    state.user_service.create_user(&mut user).await?;

    Ok((StatusCode::CREATED, Json(UserDto::from(user))))
}

/// Update user handler; the password is only replaced when a new one is sent
pub async fn update_user(
    State(state): State<SharedState>,
    Path(id): Path<i64>,
    Json(form): Json<UserForm>,
) -> Result<impl IntoResponse> {
    let update_password = form.wants_password_update();
    let role = resolve_role(&state, form.role_id).await?;
    let mut user = form.into_user(Some(id), role);

    state
        .user_service
        .update_user(&mut user, update_password)
        .await?;

    Ok((StatusCode::OK, Json(UserDto::from(user))))
}

/// Delete user handler
pub async fn delete_user(
    State(state): State<SharedState>,
    Path(id): Path<i64>,
    Extension(acting_user): Extension<ActingUser>,
) -> Result<impl IntoResponse> {
    state.user_service.delete_user(id, &acting_user).await?;
    Ok(StatusCode::NO_CONTENT)
}

// An unknown role id leaves the user without a role; validation reports it.
async fn resolve_role(state: &SharedState, role_id: Option<i64>) -> Result<Option<Role>> {
    state.user_service.get_role_by_id(role_id).await
}
