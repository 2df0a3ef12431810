use axum::{Json, Router, routing::get};
use serde::Serialize;

use crate::domain::error::DomainError;
use crate::presentation::AppState;
use crate::presentation::http::app_error::AppError;

pub(crate) mod auth;
pub(crate) mod categories;
pub(crate) mod posts;

pub(crate) fn router(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(health_handler))
        .nest("/api/auth", auth::router())
        .nest("/api/categories", categories::router(state.clone()))
        .nest("/api/posts", posts::router(state.clone()))
        .fallback(route_not_found)
        .with_state(state)
}

#[derive(Debug, Serialize)]
struct HealthzResponse {
    status: &'static str,
}

async fn health_handler() -> Json<HealthzResponse> {
    Json(HealthzResponse { status: "ok" })
}

async fn route_not_found() -> AppError {
    AppError::Domain(DomainError::NotFound("route".to_string()))
}
