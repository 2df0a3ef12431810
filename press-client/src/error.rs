use thiserror::Error;

#[derive(Debug, Error)]
/// Ошибки клиентской библиотеки `press-client`.
pub enum PressClientError {
    /// Ошибка HTTP-транспорта (`reqwest`).
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// Требуется авторизация (отсутствует/некорректен токен или неверные учётные данные).
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// Недостаточно прав (не автор поста или не администратор).
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// Запрошенный ресурс не найден.
    #[error("not found: {0}")]
    NotFound(String),

    /// Некорректный запрос, ошибка валидации или конфликт уникальности.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Внутренняя ошибка сервера или неожиданный статус.
    #[error("server error: {0}")]
    Server(String),
}

/// Результат операций `press-client`.
pub type PressClientResult<T> = Result<T, PressClientError>;

impl PressClientError {
    pub(crate) fn from_http_status(status: reqwest::StatusCode, message: Option<String>) -> Self {
        let message = message.unwrap_or_else(|| format!("http status {status}"));
        match status {
            reqwest::StatusCode::UNAUTHORIZED => Self::Unauthorized(message),
            reqwest::StatusCode::FORBIDDEN => Self::Forbidden(message),
            reqwest::StatusCode::NOT_FOUND => Self::NotFound(message),
            status if status.is_client_error() => Self::InvalidRequest(message),
            _ => Self::Server(message),
        }
    }

    pub(crate) fn from_reqwest(err: reqwest::Error) -> Self {
        if let Some(status) = err.status() {
            return Self::from_http_status(status, None);
        }
        Self::Http(err)
    }
}

#[cfg(test)]
mod tests {
    use super::PressClientError;
    use reqwest::StatusCode;

    #[test]
    fn statuses_map_to_error_kinds() {
        let message = || Some("boom".to_string());

        assert!(matches!(
            PressClientError::from_http_status(StatusCode::UNAUTHORIZED, message()),
            PressClientError::Unauthorized(_)
        ));
        assert!(matches!(
            PressClientError::from_http_status(StatusCode::FORBIDDEN, message()),
            PressClientError::Forbidden(_)
        ));
        assert!(matches!(
            PressClientError::from_http_status(StatusCode::NOT_FOUND, message()),
            PressClientError::NotFound(_)
        ));
        assert!(matches!(
            PressClientError::from_http_status(StatusCode::BAD_REQUEST, message()),
            PressClientError::InvalidRequest(msg) if msg == "boom"
        ));
        assert!(matches!(
            PressClientError::from_http_status(StatusCode::INTERNAL_SERVER_ERROR, None),
            PressClientError::Server(_)
        ));
    }
}
