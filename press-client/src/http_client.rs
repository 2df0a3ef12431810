use reqwest::{Client, Method, RequestBuilder, Url};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use std::time::Duration;

use crate::error::{PressClientError, PressClientResult};
use crate::models::{AuthResponse, Category, Comment, NewPost, Pagination, Post, PostPage, PostUpdate, User};

#[derive(Debug, Serialize)]
struct RegisterRequestDto<'a> {
    username: &'a str,
    email: &'a str,
    password: &'a str,
}

#[derive(Debug, Serialize)]
struct LoginRequestDto<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Debug, Serialize)]
struct CreateCategoryRequestDto<'a> {
    name: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<&'a str>,
}

#[derive(Debug, Serialize)]
struct AddCommentRequestDto<'a> {
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ListPostsQuery<'a> {
    page: u32,
    limit: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    category: Option<&'a str>,
}

#[derive(Debug, Serialize)]
struct SearchQuery<'a> {
    q: &'a str,
}

/// `{ success, data, pagination? }`
#[derive(Debug, Deserialize)]
struct Envelope<T> {
    data: T,
    pagination: Option<Pagination>,
}

#[derive(Debug, Deserialize)]
struct ErrorResponseDto {
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AuthResponseDto {
    id: i64,
    username: String,
    email: String,
    role: String,
    created_at: chrono::DateTime<chrono::Utc>,
    token: String,
}

impl From<AuthResponseDto> for AuthResponse {
    fn from(value: AuthResponseDto) -> Self {
        Self {
            token: value.token,
            user: User {
                id: value.id,
                username: value.username,
                email: value.email,
                role: value.role,
                created_at: value.created_at,
            },
        }
    }
}

fn into_post_page(envelope: Envelope<Vec<Post>>) -> PressClientResult<PostPage> {
    let pagination = envelope.pagination.ok_or_else(|| {
        PressClientError::Server("list response has no pagination".to_string())
    })?;
    Ok(PostPage {
        posts: envelope.data,
        pagination,
    })
}

#[derive(Debug, Clone)]
/// HTTP-клиент для работы с REST API `press-server`.
pub struct HttpClient {
    base_url: String,
    client: Client,
}

impl HttpClient {
    /// Создаёт новый HTTP-клиент с базовым URL сервера.
    pub fn new(base_url: impl Into<String>) -> PressClientResult<Self> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(5))
            .timeout(Duration::from_secs(15))
            .build()?;

        Ok(Self {
            base_url: base_url.into(),
            client,
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    /// URL поста с экранированием ключа (id или слаг).
    fn post_url(&self, key: &str) -> PressClientResult<Url> {
        let mut url = Url::parse(&self.endpoint("/api/posts"))
            .map_err(|err| PressClientError::InvalidRequest(format!("invalid server url: {err}")))?;
        url.path_segments_mut()
            .map_err(|_| PressClientError::InvalidRequest("invalid server url".to_string()))?
            .push(key);
        Ok(url)
    }

    fn request(&self, method: Method, path: &str, token: Option<&str>) -> RequestBuilder {
        let request = self.client.request(method, self.endpoint(path));
        match token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn decode_error(response: reqwest::Response) -> PressClientError {
        let status = response.status();

        let message = match response.json::<ErrorResponseDto>().await {
            Ok(body) => body.error,
            Err(_) => None,
        };
        PressClientError::from_http_status(status, message)
    }

    /// отправляет запрос и разворачивает конверт ответа
    async fn execute<T>(&self, request: RequestBuilder) -> PressClientResult<Envelope<T>>
    where
        T: DeserializeOwned,
    {
        let response = request
            .send()
            .await
            .map_err(PressClientError::from_reqwest)?;
        if !response.status().is_success() {
            return Err(Self::decode_error(response).await);
        }

        response
            .json::<Envelope<T>>()
            .await
            .map_err(PressClientError::from_reqwest)
    }

    /// Регистрирует пользователя и возвращает JWT + данные пользователя.
    pub async fn register(
        &self,
        username: &str,
        email: &str,
        password: &str,
    ) -> PressClientResult<AuthResponse> {
        let payload = RegisterRequestDto {
            username,
            email,
            password,
        };
        let envelope: Envelope<AuthResponseDto> = self
            .execute(
                self.request(Method::POST, "/api/auth/register", None)
                    .json(&payload),
            )
            .await?;
        Ok(envelope.data.into())
    }

    /// Выполняет вход по email и паролю, возвращает JWT + данные пользователя.
    pub async fn login(&self, email: &str, password: &str) -> PressClientResult<AuthResponse> {
        let payload = LoginRequestDto { email, password };
        let envelope: Envelope<AuthResponseDto> = self
            .execute(
                self.request(Method::POST, "/api/auth/login", None)
                    .json(&payload),
            )
            .await?;
        Ok(envelope.data.into())
    }

    /// Возвращает все категории, отсортированные по названию.
    pub async fn list_categories(&self) -> PressClientResult<Vec<Category>> {
        let envelope = self
            .execute(self.request(Method::GET, "/api/categories", None))
            .await?;
        Ok(envelope.data)
    }

    /// Создаёт категорию.
    ///
    /// Требует JWT-токен администратора.
    pub async fn create_category(
        &self,
        token: &str,
        name: &str,
        description: Option<&str>,
    ) -> PressClientResult<Category> {
        let payload = CreateCategoryRequestDto { name, description };
        let envelope = self
            .execute(
                self.request(Method::POST, "/api/categories", Some(token))
                    .json(&payload),
            )
            .await?;
        Ok(envelope.data)
    }

    /// Возвращает страницу опубликованных постов, при необходимости по слагу категории.
    pub async fn list_posts(
        &self,
        page: u32,
        limit: u32,
        category: Option<&str>,
    ) -> PressClientResult<PostPage> {
        let query = ListPostsQuery {
            page,
            limit,
            category,
        };
        let envelope: Envelope<Vec<Post>> = self
            .execute(self.request(Method::GET, "/api/posts", None).query(&query))
            .await?;
        into_post_page(envelope)
    }

    /// Ищет опубликованные посты по подстроке (не более 20 результатов).
    pub async fn search_posts(&self, q: &str) -> PressClientResult<Vec<Post>> {
        let envelope = self
            .execute(
                self.request(Method::GET, "/api/posts/search", None)
                    .query(&SearchQuery { q }),
            )
            .await?;
        Ok(envelope.data)
    }

    /// Получает пост по id или слагу. Каждый вызов увеличивает счётчик просмотров.
    pub async fn get_post(&self, id_or_slug: &str) -> PressClientResult<Post> {
        let url = self.post_url(id_or_slug)?;
        let envelope = self.execute(self.client.get(url)).await?;
        Ok(envelope.data)
    }

    /// Создаёт пост от имени авторизованного пользователя.
    ///
    /// Требует валидный JWT-токен.
    pub async fn create_post(&self, token: &str, post: &NewPost) -> PressClientResult<Post> {
        let envelope = self
            .execute(
                self.request(Method::POST, "/api/posts", Some(token))
                    .json(post),
            )
            .await?;
        Ok(envelope.data)
    }

    /// Обновляет пост по идентификатору.
    ///
    /// Требует токен автора поста или администратора.
    pub async fn update_post(
        &self,
        token: &str,
        id: i64,
        changes: &PostUpdate,
    ) -> PressClientResult<Post> {
        let envelope = self
            .execute(
                self.request(Method::PUT, &format!("/api/posts/{id}"), Some(token))
                    .json(changes),
            )
            .await?;
        Ok(envelope.data)
    }

    /// Удаляет пост вместе с комментариями.
    ///
    /// Требует токен автора поста или администратора.
    pub async fn delete_post(&self, token: &str, id: i64) -> PressClientResult<()> {
        let _: Envelope<serde::de::IgnoredAny> = self
            .execute(self.request(Method::DELETE, &format!("/api/posts/{id}"), Some(token)))
            .await?;
        Ok(())
    }

    /// Добавляет комментарий и возвращает полный список комментариев поста.
    ///
    /// Требует валидный JWT-токен.
    pub async fn add_comment(
        &self,
        token: &str,
        post_id: i64,
        content: &str,
    ) -> PressClientResult<Vec<Comment>> {
        let envelope = self
            .execute(
                self.request(
                    Method::POST,
                    &format!("/api/posts/{post_id}/comments"),
                    Some(token),
                )
                .json(&AddCommentRequestDto { content }),
            )
            .await?;
        Ok(envelope.data)
    }
}
