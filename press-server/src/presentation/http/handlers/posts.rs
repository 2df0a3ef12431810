use axum::{Json, extract::State, http::StatusCode};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::application::blog_service::{CommentView, ListPostsResult, PostView};
use crate::domain::category::Category;
use crate::domain::error::DomainError;
use crate::domain::post::{AddCommentRequest, CreatePostRequest, PostKey, UpdatePostRequest};
use crate::domain::user::UserSummary;
use crate::presentation::AppState;
use crate::presentation::http::app_error::{AppResult, ErrorResponse};
use crate::presentation::http::envelope::{ApiResponse, EmptyDto, PaginationDto};
use crate::presentation::http::extract::{ApiJson, ApiPath, ApiQuery};
use crate::presentation::http::middleware::auth::AuthenticatedUser;

const DEFAULT_PAGE: u32 = 1;
const DEFAULT_LIMIT: u32 = 10;

#[derive(Debug, Deserialize, ToSchema)]
pub(crate) struct CreatePostDto {
    pub(crate) title: Option<String>,
    pub(crate) content: Option<String>,
    pub(crate) excerpt: Option<String>,
    pub(crate) category_id: Option<i64>,
    pub(crate) tags: Option<Vec<String>>,
    pub(crate) is_published: Option<bool>,
}

/// Absent fields keep their stored values; an empty `excerpt` clears it.
#[derive(Debug, Deserialize, ToSchema)]
pub(crate) struct UpdatePostDto {
    pub(crate) title: Option<String>,
    pub(crate) content: Option<String>,
    pub(crate) excerpt: Option<String>,
    pub(crate) category_id: Option<i64>,
    pub(crate) tags: Option<Vec<String>>,
    pub(crate) is_published: Option<bool>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub(crate) struct AddCommentDto {
    pub(crate) content: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub(crate) struct ListPostsQuery {
    #[validate(range(min = 1))]
    pub(crate) page: Option<u32>,
    #[validate(range(min = 1, max = 100))]
    pub(crate) limit: Option<u32>,
    pub(crate) category: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub(crate) struct SearchQuery {
    #[validate(length(max = 200))]
    pub(crate) q: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct UserSummaryDto {
    pub(crate) id: i64,
    pub(crate) username: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct CategorySummaryDto {
    pub(crate) id: i64,
    pub(crate) name: String,
    pub(crate) slug: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct CommentDto {
    pub(crate) user: Option<UserSummaryDto>,
    pub(crate) content: String,
    pub(crate) created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct PostDto {
    pub(crate) id: i64,
    pub(crate) title: String,
    pub(crate) slug: String,
    pub(crate) content: String,
    pub(crate) excerpt: Option<String>,
    pub(crate) author: Option<UserSummaryDto>,
    pub(crate) category: Option<CategorySummaryDto>,
    pub(crate) tags: Vec<String>,
    pub(crate) is_published: bool,
    pub(crate) view_count: i64,
    pub(crate) comments: Vec<CommentDto>,
    pub(crate) created_at: DateTime<Utc>,
    pub(crate) updated_at: DateTime<Utc>,
}

impl From<UserSummary> for UserSummaryDto {
    fn from(user: UserSummary) -> Self {
        Self {
            id: user.id,
            username: user.username,
        }
    }
}

impl From<Category> for CategorySummaryDto {
    fn from(category: Category) -> Self {
        Self {
            id: category.id,
            name: category.name,
            slug: category.slug,
        }
    }
}

impl From<CommentView> for CommentDto {
    fn from(comment: CommentView) -> Self {
        Self {
            user: comment.user.map(UserSummaryDto::from),
            content: comment.content,
            created_at: comment.created_at,
        }
    }
}

impl From<PostView> for PostDto {
    fn from(view: PostView) -> Self {
        let post = view.post;
        Self {
            id: post.id,
            title: post.title,
            slug: post.slug,
            content: post.content,
            excerpt: post.excerpt,
            author: view.author.map(UserSummaryDto::from),
            category: view.category.map(CategorySummaryDto::from),
            tags: post.tags,
            is_published: post.is_published,
            view_count: post.view_count,
            comments: view.comments.into_iter().map(CommentDto::from).collect(),
            created_at: post.created_at,
            updated_at: post.updated_at,
        }
    }
}

impl From<ListPostsResult> for ApiResponse<Vec<PostDto>> {
    fn from(result: ListPostsResult) -> Self {
        ApiResponse::paginated(
            result.posts.into_iter().map(PostDto::from).collect(),
            PaginationDto {
                page: result.page,
                limit: result.limit,
                total: result.total,
                pages: result.pages,
            },
        )
    }
}

/// Mutating routes address posts by numeric id only.
fn parse_post_id(raw: &str) -> Result<i64, DomainError> {
    match PostKey::parse(raw) {
        PostKey::Id(id) => Ok(id),
        PostKey::Slug(_) => Err(DomainError::NotFound("post".to_string())),
    }
}

#[utoipa::path(
    get,
    path = "/api/posts",
    tag = "posts",
    params(
        ("page" = Option<u32>, Query, description = "Page number (>= 1, default 1)"),
        ("limit" = Option<u32>, Query, description = "Items per page (1..=100, default 10)"),
        ("category" = Option<String>, Query, description = "Category slug")
    ),
    responses(
        (status = 200, description = "Published posts, newest first", body = ApiResponse<Vec<PostDto>>),
        (status = 400, description = "Validation error", body = ErrorResponse),
        (status = 500, description = "Internal error", body = ErrorResponse)
    )
)]
pub(crate) async fn list_posts(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<ListPostsQuery>,
) -> AppResult<Json<ApiResponse<Vec<PostDto>>>> {
    query.validate()?;
    let page = query.page.unwrap_or(DEFAULT_PAGE);
    let limit = query.limit.unwrap_or(DEFAULT_LIMIT);

    let result = state
        .blog_service
        .list_posts(page, limit, query.category.as_deref())
        .await?;

    Ok(Json(result.into()))
}

#[utoipa::path(
    get,
    path = "/api/posts/search",
    tag = "posts",
    params(
        ("q" = String, Query, description = "Case-insensitive substring of title, content or excerpt")
    ),
    responses(
        (status = 200, description = "Up to 20 matching published posts", body = ApiResponse<Vec<PostDto>>),
        (status = 400, description = "Empty query", body = ErrorResponse),
        (status = 500, description = "Internal error", body = ErrorResponse)
    )
)]
pub(crate) async fn search_posts(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<SearchQuery>,
) -> AppResult<Json<ApiResponse<Vec<PostDto>>>> {
    query.validate()?;
    let posts = state.blog_service.search_posts(query.q.as_deref()).await?;

    Ok(Json(ApiResponse::ok(
        posts.into_iter().map(PostDto::from).collect(),
    )))
}

#[utoipa::path(
    get,
    path = "/api/posts/{id}",
    tag = "posts",
    params(
        ("id" = String, Path, description = "Post id or slug")
    ),
    responses(
        (status = 200, description = "Post found, view counted", body = ApiResponse<PostDto>),
        (status = 404, description = "Post not found", body = ErrorResponse),
        (status = 500, description = "Internal error", body = ErrorResponse)
    )
)]
pub(crate) async fn get_post(
    State(state): State<AppState>,
    ApiPath(id_or_slug): ApiPath<String>,
) -> AppResult<Json<ApiResponse<PostDto>>> {
    let post = state.blog_service.get_post(&id_or_slug).await?;

    Ok(Json(ApiResponse::ok(PostDto::from(post))))
}

#[utoipa::path(
    post,
    path = "/api/posts",
    tag = "posts",
    security(
        ("bearer_auth" = [])
    ),
    request_body = CreatePostDto,
    responses(
        (status = 201, description = "Post created", body = ApiResponse<PostDto>),
        (status = 400, description = "Validation error or duplicate slug", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 500, description = "Internal error", body = ErrorResponse)
    )
)]
pub(crate) async fn create_post(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    ApiJson(dto): ApiJson<CreatePostDto>,
) -> AppResult<(StatusCode, Json<ApiResponse<PostDto>>)> {
    let req = CreatePostRequest {
        title: dto.title,
        content: dto.content,
        excerpt: dto.excerpt,
        category_id: dto.category_id,
        tags: dto.tags,
        is_published: dto.is_published,
    };

    let post = state.blog_service.create_post(&auth.actor(), req).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok(PostDto::from(post))),
    ))
}

#[utoipa::path(
    put,
    path = "/api/posts/{id}",
    tag = "posts",
    security(
        ("bearer_auth" = [])
    ),
    params(
        ("id" = i64, Path, description = "Post id")
    ),
    request_body = UpdatePostDto,
    responses(
        (status = 200, description = "Post updated", body = ApiResponse<PostDto>),
        (status = 400, description = "Validation error", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Caller is neither the author nor an admin", body = ErrorResponse),
        (status = 404, description = "Post not found", body = ErrorResponse),
        (status = 500, description = "Internal error", body = ErrorResponse)
    )
)]
pub(crate) async fn update_post(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    ApiPath(id): ApiPath<String>,
    ApiJson(dto): ApiJson<UpdatePostDto>,
) -> AppResult<Json<ApiResponse<PostDto>>> {
    let id = parse_post_id(&id)?;
    let req = UpdatePostRequest {
        title: dto.title,
        content: dto.content,
        excerpt: dto.excerpt,
        category_id: dto.category_id,
        tags: dto.tags,
        is_published: dto.is_published,
    };

    let post = state
        .blog_service
        .update_post(&auth.actor(), id, req)
        .await?;
    Ok(Json(ApiResponse::ok(PostDto::from(post))))
}

#[utoipa::path(
    delete,
    path = "/api/posts/{id}",
    tag = "posts",
    security(
        ("bearer_auth" = [])
    ),
    params(
        ("id" = i64, Path, description = "Post id")
    ),
    responses(
        (status = 200, description = "Post deleted", body = ApiResponse<EmptyDto>),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Caller is neither the author nor an admin", body = ErrorResponse),
        (status = 404, description = "Post not found", body = ErrorResponse),
        (status = 500, description = "Internal error", body = ErrorResponse)
    )
)]
pub(crate) async fn delete_post(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    ApiPath(id): ApiPath<String>,
) -> AppResult<Json<ApiResponse<EmptyDto>>> {
    let id = parse_post_id(&id)?;
    state.blog_service.delete_post(&auth.actor(), id).await?;

    Ok(Json(ApiResponse::ok(EmptyDto::default())))
}

#[utoipa::path(
    post,
    path = "/api/posts/{id}/comments",
    tag = "posts",
    security(
        ("bearer_auth" = [])
    ),
    params(
        ("id" = i64, Path, description = "Post id")
    ),
    request_body = AddCommentDto,
    responses(
        (status = 201, description = "Comment added, full comment list returned", body = ApiResponse<Vec<CommentDto>>),
        (status = 400, description = "Empty comment", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 404, description = "Post not found", body = ErrorResponse),
        (status = 500, description = "Internal error", body = ErrorResponse)
    )
)]
pub(crate) async fn add_comment(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    ApiPath(id): ApiPath<String>,
    ApiJson(dto): ApiJson<AddCommentDto>,
) -> AppResult<(StatusCode, Json<ApiResponse<Vec<CommentDto>>>)> {
    let id = parse_post_id(&id)?;
    let req = AddCommentRequest {
        content: dto.content,
    };

    let comments = state
        .blog_service
        .add_comment(&auth.actor(), id, req)
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok(
            comments.into_iter().map(CommentDto::from).collect(),
        )),
    ))
}
