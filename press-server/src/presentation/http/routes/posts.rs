use axum::Router;
use axum::middleware;
use axum::routing::{get, post, put};

use crate::presentation::AppState;
use crate::presentation::http::handlers::posts::{
    add_comment, create_post, delete_post, get_post, list_posts, search_posts, update_post,
};
use crate::presentation::http::middleware::auth::jwt_auth_middleware;

pub(crate) fn router(state: AppState) -> Router<AppState> {
    let public = Router::new()
        .route("/", get(list_posts))
        .route("/search", get(search_posts))
        .route("/{id}", get(get_post));

    let protected = Router::new()
        .route("/", post(create_post))
        .route("/{id}", put(update_post).delete(delete_post))
        .route("/{id}/comments", post(add_comment))
        .route_layer(middleware::from_fn_with_state(state, jwt_auth_middleware));

    public.merge(protected)
}
