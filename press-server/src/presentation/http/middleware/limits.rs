use std::time::Duration;

use anyhow::anyhow;
use axum::extract::DefaultBodyLimit;
use axum::{BoxError, Router, error_handling::HandleErrorLayer};
use tower::ServiceBuilder;
use tower::limit::GlobalConcurrencyLimitLayer;
use tower::timeout::error::Elapsed;

use crate::infrastructure::settings::Settings;
use crate::presentation::http::app_error::AppError;

// Body limit is enforced by the extractors, so 413 goes through AppError.
pub(crate) fn apply_limits(router: Router, settings: &Settings) -> Router {
    router
        .layer(
            ServiceBuilder::new()
                .layer(HandleErrorLayer::new(handle_layer_error))
                .timeout(Duration::from_secs(settings.http_request_timeout_secs))
                .layer(GlobalConcurrencyLimitLayer::new(
                    settings.http_concurrency_limit,
                )),
        )
        .layer(DefaultBodyLimit::max(settings.http_request_body_limit_bytes))
}

async fn handle_layer_error(err: BoxError) -> AppError {
    if err.is::<Elapsed>() {
        AppError::Timeout
    } else {
        AppError::Internal(anyhow!("unhandled middleware error: {err}"))
    }
}
