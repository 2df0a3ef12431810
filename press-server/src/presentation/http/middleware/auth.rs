use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header, request::Parts},
    middleware::Next,
    response::Response,
};
use tracing::warn;

use crate::domain::policy::{Actor, require_role};
use crate::domain::user::Role;
use crate::presentation::AppState;
use crate::presentation::http::app_error::AppError;

pub(crate) const ADMIN_ONLY: &[Role] = &[Role::Admin];

#[derive(Debug, Clone)]
pub(crate) struct AuthenticatedUser {
    pub(crate) user_id: i64,
    pub(crate) username: String,
    pub(crate) role: Role,
}

impl AuthenticatedUser {
    pub(crate) fn actor(&self) -> Actor {
        Actor {
            user_id: self.user_id,
            role: self.role,
        }
    }
}

impl<S> FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthenticatedUser>()
            .cloned()
            .ok_or(AppError::Unauthorized)
    }
}

fn bearer_token(value: &str) -> Option<&str> {
    let mut parts = value.split_whitespace();
    let scheme = parts.next()?;
    let token = parts.next()?;
    if parts.next().is_some() || !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    Some(token)
}

pub(crate) async fn jwt_auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(bearer_token)
        .ok_or(AppError::Unauthorized)?;

    let claims = state
        .jwt
        .verify_token(token)
        .map_err(|_| AppError::Unauthorized)?;

    request.extensions_mut().insert(AuthenticatedUser {
        user_id: claims.user_id,
        username: claims.username,
        role: claims.role,
    });

    Ok(next.run(request).await)
}

/// Must run after [`jwt_auth_middleware`].
pub(crate) async fn authorize(
    State(allowed): State<&'static [Role]>,
    user: AuthenticatedUser,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    if let Err(err) = require_role(&user.actor(), allowed) {
        warn!(username = %user.username, role = %user.role, "role check failed");
        return Err(err.into());
    }
    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::bearer_token;

    #[test]
    fn bearer_token_requires_scheme_and_single_token() {
        assert_eq!(bearer_token("Bearer abc"), Some("abc"));
        assert_eq!(bearer_token("bearer abc"), Some("abc"));
        assert_eq!(bearer_token("Basic abc"), None);
        assert_eq!(bearer_token("Bearer"), None);
        assert_eq!(bearer_token("Bearer abc def"), None);
    }
}
