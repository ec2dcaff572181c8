use axum::{
    extract::{Json, Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;

use super::SharedState;
use crate::{error::Result, models::Role};

#[derive(Debug, Deserialize)]
pub struct RoleForm {
    #[serde(default)]
    pub name: String,
}

/// Get all roles handler
pub async fn get_all_roles(State(state): State<SharedState>) -> Result<impl IntoResponse> {
    let roles = state.user_service.get_all_roles().await?;
    Ok((StatusCode::OK, Json(roles)))
}

/// Create role handler
pub async fn create_role(
    State(state): State<SharedState>,
    Json(form): Json<RoleForm>,
) -> Result<impl IntoResponse> {
    let mut role = Role::new(form.name);
    state.user_service.create_role(&mut role).await?;
    Ok((StatusCode::CREATED, Json(role)))
}

/// Delete role handler
pub async fn delete_role(
    State(state): State<SharedState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse> {
    state.user_service.delete_role(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
