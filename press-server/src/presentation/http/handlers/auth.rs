use axum::{Json, extract::State, http::StatusCode};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::application::auth_service::AuthResult;
use crate::domain::user::{LoginRequest, RegisterRequest};
use crate::presentation::AppState;
use crate::presentation::http::app_error::{AppResult, ErrorResponse};
use crate::presentation::http::envelope::ApiResponse;
use crate::presentation::http::extract::ApiJson;

#[derive(Debug, Deserialize, ToSchema)]
pub(crate) struct RegisterDto {
    pub(crate) username: String,
    pub(crate) email: String,
    pub(crate) password: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub(crate) struct LoginDto {
    pub(crate) email: String,
    pub(crate) password: String,
}

/// Public profile plus a bearer token.
#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct AuthResponseDto {
    pub(crate) id: i64,
    pub(crate) username: String,
    pub(crate) email: String,
    pub(crate) role: String,
    pub(crate) created_at: DateTime<Utc>,
    pub(crate) token: String,
}

impl From<AuthResult> for AuthResponseDto {
    fn from(result: AuthResult) -> Self {
        Self {
            id: result.user.id,
            username: result.user.username,
            email: result.user.email,
            role: result.user.role.to_string(),
            created_at: result.user.created_at,
            token: result.access_token,
        }
    }
}

#[utoipa::path(
    post,
    path = "/api/auth/register",
    tag = "auth",
    request_body = RegisterDto,
    responses(
        (status = 201, description = "Registered successfully", body = ApiResponse<AuthResponseDto>),
        (status = 400, description = "Validation error or user already exists", body = ErrorResponse),
        (status = 500, description = "Internal error", body = ErrorResponse)
    )
)]
pub(crate) async fn register(
    State(state): State<AppState>,
    ApiJson(dto): ApiJson<RegisterDto>,
) -> AppResult<(StatusCode, Json<ApiResponse<AuthResponseDto>>)> {
    let req = RegisterRequest {
        username: dto.username,
        email: dto.email,
        password: dto.password,
    };

    let result = state.auth_service.register(req).await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok(AuthResponseDto::from(result))),
    ))
}

#[utoipa::path(
    post,
    path = "/api/auth/login",
    tag = "auth",
    request_body = LoginDto,
    responses(
        (status = 200, description = "Login successful", body = ApiResponse<AuthResponseDto>),
        (status = 400, description = "Validation error", body = ErrorResponse),
        (status = 401, description = "Invalid credentials", body = ErrorResponse),
        (status = 500, description = "Internal error", body = ErrorResponse)
    )
)]
pub(crate) async fn login(
    State(state): State<AppState>,
    ApiJson(dto): ApiJson<LoginDto>,
) -> AppResult<(StatusCode, Json<ApiResponse<AuthResponseDto>>)> {
    let req = LoginRequest {
        email: dto.email,
        password: dto.password,
    };

    let result = state.auth_service.login(req).await?;

    Ok((
        StatusCode::OK,
        Json(ApiResponse::ok(AuthResponseDto::from(result))),
    ))
}
