use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::presentation::http::app_error::ErrorResponse;
use crate::presentation::http::envelope::{EmptyDto, PaginationDto};
use crate::presentation::http::handlers::auth::{AuthResponseDto, LoginDto, RegisterDto};
use crate::presentation::http::handlers::categories::{CategoryDto, CreateCategoryDto};
use crate::presentation::http::handlers::posts::{
    AddCommentDto, CategorySummaryDto, CommentDto, CreatePostDto, ListPostsQuery, PostDto,
    SearchQuery, UpdatePostDto, UserSummaryDto,
};

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::presentation::http::handlers::auth::register,
        crate::presentation::http::handlers::auth::login,
        crate::presentation::http::handlers::categories::list_categories,
        crate::presentation::http::handlers::categories::create_category,
        crate::presentation::http::handlers::posts::list_posts,
        crate::presentation::http::handlers::posts::search_posts,
        crate::presentation::http::handlers::posts::get_post,
        crate::presentation::http::handlers::posts::create_post,
        crate::presentation::http::handlers::posts::update_post,
        crate::presentation::http::handlers::posts::delete_post,
        crate::presentation::http::handlers::posts::add_comment
    ),
    components(
        schemas(
            ErrorResponse,
            PaginationDto,
            EmptyDto,
            RegisterDto,
            LoginDto,
            AuthResponseDto,
            CreateCategoryDto,
            CategoryDto,
            CreatePostDto,
            UpdatePostDto,
            AddCommentDto,
            ListPostsQuery,
            SearchQuery,
            UserSummaryDto,
            CategorySummaryDto,
            CommentDto,
            PostDto
        )
    ),
    tags(
        (name = "auth", description = "Registration and login"),
        (name = "categories", description = "Post categories"),
        (name = "posts", description = "Posts, search and comments")
    ),
    modifiers(&SecurityAddon)
)]
pub(crate) struct ApiDoc;

pub(crate) struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let mut components = openapi.components.take().unwrap_or_default();
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
        openapi.components = Some(components);
    }
}

#[cfg(test)]
mod tests {
    use utoipa::OpenApi;

    use super::ApiDoc;

    #[test]
    fn document_lists_every_route() {
        let doc = ApiDoc::openapi();
        let paths: Vec<_> = doc.paths.paths.keys().cloned().collect();

        for expected in [
            "/api/auth/register",
            "/api/auth/login",
            "/api/categories",
            "/api/posts",
            "/api/posts/search",
            "/api/posts/{id}",
            "/api/posts/{id}/comments",
        ] {
            assert!(paths.iter().any(|path| path == expected), "missing {expected}");
        }
    }
}
