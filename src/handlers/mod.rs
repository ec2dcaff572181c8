use std::sync::Arc;

use axum::{
    middleware,
    routing::{delete, get, post},
    Router,
};
use tower_http::trace::TraceLayer;

use crate::services::{AuthService, UserService};

pub mod auth;
pub mod gate;
pub mod role;
pub mod user;

/// Services shared by every request
pub struct AppState {
    pub user_service: UserService,
    pub auth_service: AuthService,
}

pub type SharedState = Arc<AppState>;

/// Build the HTTP application.
pub fn router(state: SharedState) -> Router {
    let public_routes = Router::new()
        .route("/health", get(health))
        .route("/login", post(auth::login))
        .route("/logout", post(auth::logout));

    let user_routes = Router::new()
        .route("/user/home", get(auth::user_home))
        .route_layer(middleware::from_fn_with_state(state.clone(), gate::require_auth));

    let admin_routes = Router::new()
        .route("/admin/users", get(user::get_all_users).post(user::create_user))
        .route(
            "/admin/users/{id}",
            get(user::get_user_by_id)
                .put(user::update_user)
                .delete(user::delete_user),
        )
        .route("/admin/roles", get(role::get_all_roles).post(role::create_role))
        .route("/admin/roles/{id}", delete(role::delete_role))
        .route_layer(middleware::from_fn(gate::require_admin))
        .route_layer(middleware::from_fn_with_state(state.clone(), gate::require_auth));

    Router::new()
        .merge(public_routes)
        .merge(user_routes)
        .merge(admin_routes)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health() -> &'static str {
    "User admin server is running."
}
