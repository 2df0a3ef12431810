use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
/// Публичная модель пользователя.
pub struct User {
    /// Идентификатор пользователя.
    pub id: i64,
    /// Логин.
    pub username: String,
    /// Email.
    pub email: String,
    /// Роль: `user` или `admin`.
    pub role: String,
    /// Дата и время создания пользователя (UTC).
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
/// Ответ после успешной регистрации или входа.
pub struct AuthResponse {
    /// JWT access token.
    pub token: String,
    /// Данные пользователя.
    pub user: User,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
/// Категория постов.
pub struct Category {
    /// Идентификатор категории.
    pub id: i64,
    /// Название.
    pub name: String,
    /// Слаг, по которому фильтруется список постов.
    pub slug: String,
    /// Необязательное описание.
    pub description: Option<String>,
    /// Дата и время создания (UTC).
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
/// Краткие данные автора поста или комментария.
pub struct UserRef {
    /// Идентификатор пользователя.
    pub id: i64,
    /// Логин.
    pub username: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
/// Краткие данные категории поста.
pub struct CategoryRef {
    /// Идентификатор категории.
    pub id: i64,
    /// Название.
    pub name: String,
    /// Слаг.
    pub slug: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
/// Комментарий к посту.
pub struct Comment {
    /// Автор комментария (`None`, если пользователь удалён).
    pub user: Option<UserRef>,
    /// Текст комментария.
    pub content: String,
    /// Дата и время создания (UTC).
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
/// Публичная модель поста.
pub struct Post {
    /// Идентификатор поста.
    pub id: i64,
    /// Заголовок поста.
    pub title: String,
    /// Слаг, альтернативный ключ поста.
    pub slug: String,
    /// Содержимое поста.
    pub content: String,
    /// Краткое описание.
    pub excerpt: Option<String>,
    /// Автор.
    pub author: Option<UserRef>,
    /// Категория.
    pub category: Option<CategoryRef>,
    /// Теги.
    pub tags: Vec<String>,
    /// Опубликован ли пост.
    pub is_published: bool,
    /// Количество просмотров.
    pub view_count: i64,
    /// Комментарии в порядке добавления.
    pub comments: Vec<Comment>,
    /// Дата и время создания поста (UTC).
    pub created_at: DateTime<Utc>,
    /// Дата и время последнего обновления поста (UTC).
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
/// Параметры страницы в ответе списка постов.
pub struct Pagination {
    /// Номер страницы (с 1).
    pub page: u32,
    /// Размер страницы.
    pub limit: u32,
    /// Общее количество опубликованных постов.
    pub total: i64,
    /// Количество страниц.
    pub pages: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
/// Страница списка постов.
pub struct PostPage {
    /// Посты текущей страницы, новые первыми.
    pub posts: Vec<Post>,
    /// Параметры пагинации.
    pub pagination: Pagination,
}

#[derive(Debug, Clone, Default, Serialize)]
/// Данные для создания поста.
pub struct NewPost {
    /// Заголовок (до 100 символов).
    pub title: String,
    /// Содержимое.
    pub content: String,
    /// Краткое описание (до 200 символов).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub excerpt: Option<String>,
    /// Идентификатор категории.
    pub category_id: i64,
    /// Теги.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    /// Публиковать ли пост сразу (по умолчанию сервер публикует).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_published: Option<bool>,
}

#[derive(Debug, Clone, Default, Serialize)]
/// Изменения поста. Незаданные поля остаются прежними.
pub struct PostUpdate {
    /// Новый заголовок.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Новое содержимое.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    /// Новое краткое описание; пустая строка удаляет его.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub excerpt: Option<String>,
    /// Новая категория.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_id: Option<i64>,
    /// Новый набор тегов.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    /// Новый статус публикации.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_published: Option<bool>,
}
