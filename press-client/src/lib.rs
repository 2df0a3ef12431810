//! Клиентская библиотека для работы с press-server по HTTP.
//!
//! Предоставляет `PressClient` поверх REST API (`reqwest`): регистрация и вход,
//! категории, посты, поиск и комментарии.
//!
//! Клиент хранит JWT-токен после `register`/`login` и автоматически использует
//! его в защищённых операциях.
#![warn(missing_docs)]

mod error;
mod http_client;
mod models;

pub use error::{PressClientError, PressClientResult};
pub use models::{
    AuthResponse, Category, CategoryRef, Comment, NewPost, Pagination, Post, PostPage,
    PostUpdate, User, UserRef,
};

use http_client::HttpClient;

#[derive(Debug, Clone)]
/// Клиент блог-сервиса.
pub struct PressClient {
    http: HttpClient,
    token: Option<String>,
}

impl PressClient {
    /// Создаёт клиент для сервера с базовым URL, например `http://127.0.0.1:8080`.
    pub fn new(base_url: impl Into<String>) -> PressClientResult<Self> {
        Ok(Self {
            http: HttpClient::new(base_url)?,
            token: None,
        })
    }

    /// Устанавливает JWT-токен вручную.
    pub fn set_token(&mut self, token: impl Into<String>) {
        self.token = Some(token.into());
    }

    /// Возвращает текущий JWT-токен, если он установлен.
    pub fn get_token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    /// Очищает сохранённый JWT-токен.
    pub fn clear_token(&mut self) {
        self.token = None;
    }

    /// Регистрирует пользователя и сохраняет полученный JWT-токен в клиенте.
    pub async fn register(
        &mut self,
        username: &str,
        email: &str,
        password: &str,
    ) -> PressClientResult<AuthResponse> {
        let result = self.http.register(username, email, password).await?;
        self.token = Some(result.token.clone());
        Ok(result)
    }

    /// Выполняет вход по email и сохраняет полученный JWT-токен в клиенте.
    pub async fn login(&mut self, email: &str, password: &str) -> PressClientResult<AuthResponse> {
        let result = self.http.login(email, password).await?;
        self.token = Some(result.token.clone());
        Ok(result)
    }

    /// Возвращает все категории.
    pub async fn list_categories(&self) -> PressClientResult<Vec<Category>> {
        self.http.list_categories().await
    }

    /// Создаёт категорию.
    ///
    /// Требует токен администратора.
    pub async fn create_category(
        &self,
        name: &str,
        description: Option<&str>,
    ) -> PressClientResult<Category> {
        let token = self.require_token()?;
        self.http.create_category(token, name, description).await
    }

    /// Возвращает страницу опубликованных постов.
    ///
    /// `page` начинается с 1, `limit` от 1 до 100. `category` задаёт слаг категории;
    /// неизвестный слаг сервер игнорирует.
    pub async fn list_posts(
        &self,
        page: u32,
        limit: u32,
        category: Option<&str>,
    ) -> PressClientResult<PostPage> {
        self.http.list_posts(page, limit, category).await
    }

    /// Ищет опубликованные посты по подстроке заголовка, текста или описания.
    pub async fn search_posts(&self, q: &str) -> PressClientResult<Vec<Post>> {
        self.http.search_posts(q).await
    }

    /// Возвращает пост по id или слагу и увеличивает счётчик просмотров.
    pub async fn get_post(&self, id_or_slug: &str) -> PressClientResult<Post> {
        self.http.get_post(id_or_slug).await
    }

    /// Создаёт новый пост.
    ///
    /// Требует установленный JWT-токен.
    pub async fn create_post(&self, post: &NewPost) -> PressClientResult<Post> {
        let token = self.require_token()?;
        self.http.create_post(token, post).await
    }

    /// Обновляет пост по идентификатору.
    ///
    /// Требует токен автора поста или администратора.
    pub async fn update_post(&self, id: i64, changes: &PostUpdate) -> PressClientResult<Post> {
        let token = self.require_token()?;
        self.http.update_post(token, id, changes).await
    }

    /// Удаляет пост по идентификатору.
    ///
    /// Требует токен автора поста или администратора.
    pub async fn delete_post(&self, id: i64) -> PressClientResult<()> {
        let token = self.require_token()?;
        self.http.delete_post(token, id).await
    }

    /// Добавляет комментарий к посту и возвращает все комментарии.
    ///
    /// Требует установленный JWT-токен.
    pub async fn add_comment(&self, post_id: i64, content: &str) -> PressClientResult<Vec<Comment>> {
        let token = self.require_token()?;
        self.http.add_comment(token, post_id, content).await
    }

    fn require_token(&self) -> PressClientResult<&str> {
        self.token
            .as_deref()
            .ok_or_else(|| PressClientError::Unauthorized("token is not set".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::{PressClient, PressClientError};

    #[tokio::test]
    async fn protected_calls_fail_fast_without_token() {
        let client = PressClient::new("http://127.0.0.1:9").expect("client must build");

        let err = client
            .delete_post(1)
            .await
            .expect_err("no token must fail");
        assert!(matches!(err, PressClientError::Unauthorized(_)));
    }

    #[test]
    fn token_can_be_set_and_cleared() {
        let mut client = PressClient::new("http://127.0.0.1:9").expect("client must build");
        assert!(client.get_token().is_none());

        client.set_token("abc");
        assert_eq!(client.get_token(), Some("abc"));

        client.clear_token();
        assert!(client.get_token().is_none());
    }
}
