use std::sync::Arc;

use anyhow::{Context, Result};

mod application;
mod data;
mod domain;
mod infrastructure;
mod presentation;
mod server;

use data::repositories::postgres::category_repository::PostgresCategoryRepository;
use data::repositories::postgres::post_repository::PostgresPostRepository;
use data::repositories::postgres::user_repository::PostgresUserRepository;
use domain::user::RegisterRequest;
use infrastructure::database::{create_pool, run_migrations};
use infrastructure::jwt::JwtService;
use infrastructure::logging::init_logging;
use infrastructure::settings::Settings;
use presentation::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let settings = Settings::from_env()?;

    init_logging(&settings.log_level)?;

    let pool = create_pool(&settings.database_url, settings.database_max_connections).await?;
    run_migrations(&pool).await?;

    let jwt = Arc::new(JwtService::new(
        &settings.jwt_secret,
        settings.jwt_ttl_seconds,
    ));
    let state = AppState::new(
        Arc::new(PostgresUserRepository::new(pool.clone())),
        Arc::new(PostgresCategoryRepository::new(pool.clone())),
        Arc::new(PostgresPostRepository::new(pool)),
        jwt,
    );

    if let Some(admin) = &settings.admin {
        state
            .auth_service
            .ensure_admin(RegisterRequest {
                username: admin.username.clone(),
                email: admin.email.clone(),
                password: admin.password.clone(),
            })
            .await
            .context("failed to bootstrap admin account")?;
    }

    server::run_http(&settings, state).await
}
