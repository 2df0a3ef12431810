use axum::Router;
use axum::middleware;
use axum::routing::{get, post};

use crate::presentation::AppState;
use crate::presentation::http::handlers::categories::{create_category, list_categories};
use crate::presentation::http::middleware::auth::{ADMIN_ONLY, authorize, jwt_auth_middleware};

pub(crate) fn router(state: AppState) -> Router<AppState> {
    let public = Router::new().route("/", get(list_categories));

    let admin = Router::new()
        .route("/", post(create_category))
        .route_layer(middleware::from_fn_with_state(ADMIN_ONLY, authorize))
        .route_layer(middleware::from_fn_with_state(state, jwt_auth_middleware));

    public.merge(admin)
}
