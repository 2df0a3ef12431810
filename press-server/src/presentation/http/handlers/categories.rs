use axum::{Json, extract::State, http::StatusCode};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::category::{Category, CreateCategoryRequest};
use crate::presentation::AppState;
use crate::presentation::http::app_error::{AppResult, ErrorResponse};
use crate::presentation::http::envelope::ApiResponse;
use crate::presentation::http::extract::ApiJson;

#[derive(Debug, Deserialize, ToSchema)]
pub(crate) struct CreateCategoryDto {
    pub(crate) name: Option<String>,
    pub(crate) description: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct CategoryDto {
    pub(crate) id: i64,
    pub(crate) name: String,
    pub(crate) slug: String,
    pub(crate) description: Option<String>,
    pub(crate) created_at: DateTime<Utc>,
}

impl From<Category> for CategoryDto {
    fn from(category: Category) -> Self {
        Self {
            id: category.id,
            name: category.name,
            slug: category.slug,
            description: category.description,
            created_at: category.created_at,
        }
    }
}

#[utoipa::path(
    get,
    path = "/api/categories",
    tag = "categories",
    responses(
        (status = 200, description = "Categories sorted by name", body = ApiResponse<Vec<CategoryDto>>),
        (status = 500, description = "Internal error", body = ErrorResponse)
    )
)]
pub(crate) async fn list_categories(
    State(state): State<AppState>,
) -> AppResult<Json<ApiResponse<Vec<CategoryDto>>>> {
    let categories = state.category_service.list_categories().await?;

    Ok(Json(ApiResponse::ok(
        categories.into_iter().map(CategoryDto::from).collect(),
    )))
}

#[utoipa::path(
    post,
    path = "/api/categories",
    tag = "categories",
    security(
        ("bearer_auth" = [])
    ),
    request_body = CreateCategoryDto,
    responses(
        (status = 201, description = "Category created", body = ApiResponse<CategoryDto>),
        (status = 400, description = "Validation error or category already exists", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Admin role required", body = ErrorResponse),
        (status = 500, description = "Internal error", body = ErrorResponse)
    )
)]
pub(crate) async fn create_category(
    State(state): State<AppState>,
    ApiJson(dto): ApiJson<CreateCategoryDto>,
) -> AppResult<(StatusCode, Json<ApiResponse<CategoryDto>>)> {
    let req = CreateCategoryRequest {
        name: dto.name,
        description: dto.description,
    };

    let category = state.category_service.create_category(req).await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok(CategoryDto::from(category))),
    ))
}
