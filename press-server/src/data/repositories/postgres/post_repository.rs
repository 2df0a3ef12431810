use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::{FromRow, PgPool};

use crate::data::post_repository::{NewPost, Pagination, PostFilter, PostRepository};
use crate::domain::error::DomainError;
use crate::domain::post::{Comment, Post, PostKey, PostPatch};

macro_rules! post_columns {
    () => {
        "id, title, slug, content, excerpt, author_id, category_id, tags, is_published, \
         view_count, comments, created_at, updated_at"
    };
}

#[derive(Debug, Clone)]
pub(crate) struct PostgresPostRepository {
    pool: PgPool,
}

impl PostgresPostRepository {
    pub(crate) fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(FromRow)]
struct PostRow {
    id: i64,
    title: String,
    slug: String,
    content: String,
    excerpt: Option<String>,
    author_id: i64,
    category_id: i64,
    tags: Vec<String>,
    is_published: bool,
    view_count: i64,
    comments: Json<Vec<Comment>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<PostRow> for Post {
    fn from(row: PostRow) -> Self {
        Self {
            id: row.id,
            title: row.title,
            slug: row.slug,
            content: row.content,
            excerpt: row.excerpt,
            author_id: row.author_id,
            category_id: row.category_id,
            tags: row.tags,
            is_published: row.is_published,
            view_count: row.view_count,
            comments: row.comments.0,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(FromRow)]
struct CommentsRow {
    comments: Json<Vec<Comment>>,
}

#[async_trait]
impl PostRepository for PostgresPostRepository {
    async fn create_post(&self, input: NewPost) -> Result<Post, DomainError> {
        let draft = input.draft;
        let row = sqlx::query_as::<_, PostRow>(concat!(
            r#"
            INSERT INTO posts (title, slug, content, excerpt, author_id, category_id, tags, is_published)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING "#,
            post_columns!()
        ))
        .bind(&draft.title)
        .bind(&draft.slug)
        .bind(&draft.content)
        .bind(&draft.excerpt)
        .bind(input.author_id)
        .bind(draft.category_id)
        .bind(&draft.tags)
        .bind(draft.is_published)
        .fetch_one(&self.pool)
        .await
        .map_err(map_post_db_error)?;

        Ok(row.into())
    }

    async fn get_post(&self, id: i64) -> Result<Option<Post>, DomainError> {
        let row = sqlx::query_as::<_, PostRow>(concat!(
            "SELECT ",
            post_columns!(),
            " FROM posts WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_post_db_error)?;

        Ok(row.map(Post::from))
    }

    async fn record_view(&self, key: &PostKey) -> Result<Option<Post>, DomainError> {
        let query = match key {
            PostKey::Id(id) => sqlx::query_as::<_, PostRow>(concat!(
                "UPDATE posts SET view_count = view_count + 1 WHERE id = $1 RETURNING ",
                post_columns!()
            ))
            .bind(*id),
            PostKey::Slug(slug) => sqlx::query_as::<_, PostRow>(concat!(
                "UPDATE posts SET view_count = view_count + 1 WHERE slug = $1 RETURNING ",
                post_columns!()
            ))
            .bind(slug.as_str()),
        };

        let row = query
            .fetch_optional(&self.pool)
            .await
            .map_err(map_post_db_error)?;

        Ok(row.map(Post::from))
    }

    async fn update_post(&self, id: i64, patch: PostPatch) -> Result<Option<Post>, DomainError> {
        let row = sqlx::query_as::<_, PostRow>(concat!(
            r#"
            UPDATE posts
            SET title = $2,
                content = $3,
                excerpt = $4,
                category_id = $5,
                tags = $6,
                is_published = $7,
                updated_at = NOW()
            WHERE id = $1
            RETURNING "#,
            post_columns!()
        ))
        .bind(id)
        .bind(&patch.title)
        .bind(&patch.content)
        .bind(&patch.excerpt)
        .bind(patch.category_id)
        .bind(&patch.tags)
        .bind(patch.is_published)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_post_db_error)?;

        Ok(row.map(Post::from))
    }

    async fn delete_post(&self, id: i64) -> Result<bool, DomainError> {
        let result = sqlx::query(
            r#"
            DELETE FROM posts
            WHERE id = $1
            "#,
        )
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(map_post_db_error)?;

        Ok(result.rows_affected() > 0)
    }

    async fn list_published(
        &self,
        filter: PostFilter,
        pagination: Pagination,
    ) -> Result<Vec<Post>, DomainError> {
        let rows = sqlx::query_as::<_, PostRow>(concat!(
            "SELECT ",
            post_columns!(),
            r#"
            FROM posts
            WHERE is_published
              AND ($1::BIGINT IS NULL OR category_id = $1)
            ORDER BY created_at DESC, id DESC
            LIMIT $2
            OFFSET $3
            "#
        ))
        .bind(filter.category_id)
        .bind(i64::from(pagination.limit))
        .bind(pagination.offset())
        .fetch_all(&self.pool)
        .await
        .map_err(map_post_db_error)?;

        Ok(rows.into_iter().map(Post::from).collect())
    }

    async fn count_published(&self, filter: PostFilter) -> Result<i64, DomainError> {
        let count: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*)
            FROM posts
            WHERE is_published
              AND ($1::BIGINT IS NULL OR category_id = $1)
            "#,
        )
        .bind(filter.category_id)
        .fetch_one(&self.pool)
        .await
        .map_err(map_post_db_error)?;

        Ok(count)
    }

    async fn search_published(&self, query: &str, limit: u32) -> Result<Vec<Post>, DomainError> {
        let pattern = format!("%{}%", escape_like(query));
        let rows = sqlx::query_as::<_, PostRow>(concat!(
            "SELECT ",
            post_columns!(),
            r#"
            FROM posts
            WHERE is_published
              AND (title ILIKE $1 OR content ILIKE $1 OR COALESCE(excerpt, '') ILIKE $1)
            ORDER BY created_at DESC, id DESC
            LIMIT $2
            "#
        ))
        .bind(&pattern)
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await
        .map_err(map_post_db_error)?;

        Ok(rows.into_iter().map(Post::from).collect())
    }

    async fn append_comment(
        &self,
        post_id: i64,
        comment: Comment,
    ) -> Result<Option<Vec<Comment>>, DomainError> {
        let row = sqlx::query_as::<_, CommentsRow>(
            r#"
            UPDATE posts
            SET comments = comments || $2
            WHERE id = $1
            RETURNING comments
            "#,
        )
        .bind(post_id)
        .bind(Json(vec![comment]))
        .fetch_optional(&self.pool)
        .await
        .map_err(map_post_db_error)?;

        Ok(row.map(|row| row.comments.0))
    }
}

/// `%`, `_` and `\` in user input must match literally.
fn escape_like(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for ch in raw.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}

fn map_post_db_error(err: sqlx::Error) -> DomainError {
    if let sqlx::Error::Database(db_err) = &err {
        match (db_err.code().as_deref(), db_err.constraint()) {
            (Some("23505"), Some("posts_slug_key")) => {
                return DomainError::AlreadyExists("post with this title".to_string());
            }
            (Some("23503"), Some("posts_category_id_fkey")) => {
                return DomainError::validation("category", "must reference an existing category");
            }
            (Some("23503"), _) => return DomainError::NotFound("author".to_string()),
            _ => {}
        }
    }
    DomainError::Unexpected(err.to_string())
}

#[cfg(test)]
mod tests {
    use super::escape_like;

    #[test]
    fn escape_like_escapes_wildcards() {
        assert_eq!(escape_like("100%_off\\"), "100\\%\\_off\\\\");
        assert_eq!(escape_like("World"), "World");
    }
}
