use std::sync::Arc;

use anyhow::Context;
use tracing::info;

use user_admin_server::{
    config::Config,
    db,
    handlers::{self, AppState},
    services::{AuthService, PasswordScheme, UserService},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "user_admin_server=debug,tower_http=debug".into()),
        )
        .init();

    let config = Config::from_env().context("Invalid configuration")?;

    let pool = db::init_db_pool(&config).await?;

    let user_service = UserService::new(pool.clone(), config.password_scheme);
    user_service
        .seed_defaults(config.admin_seed.as_ref())
        .await
        .context("Failed to seed default roles")?;
    if config.password_scheme == PasswordScheme::Argon2 {
        user_service
            .migrate_passwords()
            .await
            .context("Failed to migrate stored passwords")?;
    }

    let auth_service = AuthService::new(
        user_service.user_store().clone(),
        config.jwt_secret.clone(),
        config.jwt_expiration_hours,
    );

    let state = Arc::new(AppState {
        user_service,
        auth_service,
    });
    let app = handlers::router(state);

    let addr = config.server_addr();
    info!("User admin server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    pool.close().await;
    Ok(())
}
