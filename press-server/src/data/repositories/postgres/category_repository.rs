use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};

use crate::data::category_repository::CategoryRepository;
use crate::domain::category::{Category, CategoryDraft};
use crate::domain::error::DomainError;

#[derive(Debug, Clone)]
pub(crate) struct PostgresCategoryRepository {
    pool: PgPool,
}

impl PostgresCategoryRepository {
    pub(crate) fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(FromRow)]
struct CategoryRow {
    id: i64,
    name: String,
    slug: String,
    description: Option<String>,
    created_at: DateTime<Utc>,
}

impl From<CategoryRow> for Category {
    fn from(row: CategoryRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            slug: row.slug,
            description: row.description,
            created_at: row.created_at,
        }
    }
}

#[async_trait]
impl CategoryRepository for PostgresCategoryRepository {
    async fn create_category(&self, input: CategoryDraft) -> Result<Category, DomainError> {
        let row = sqlx::query_as::<_, CategoryRow>(
            r#"
            INSERT INTO categories (name, slug, description)
            VALUES ($1, $2, $3)
            RETURNING id, name, slug, description, created_at
            "#,
        )
        .bind(&input.name)
        .bind(&input.slug)
        .bind(&input.description)
        .fetch_one(&self.pool)
        .await
        .map_err(map_category_db_error)?;

        Ok(row.into())
    }

    async fn list_categories(&self) -> Result<Vec<Category>, DomainError> {
        let rows = sqlx::query_as::<_, CategoryRow>(
            r#"
            SELECT id, name, slug, description, created_at
            FROM categories
            ORDER BY name ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(map_category_db_error)?;

        Ok(rows.into_iter().map(Category::from).collect())
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<Category>, DomainError> {
        let row = sqlx::query_as::<_, CategoryRow>(
            r#"
            SELECT id, name, slug, description, created_at
            FROM categories
            WHERE slug = $1
            "#,
        )
        .bind(slug)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_category_db_error)?;

        Ok(row.map(Category::from))
    }

    async fn find_by_ids(&self, ids: &[i64]) -> Result<Vec<Category>, DomainError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let rows = sqlx::query_as::<_, CategoryRow>(
            r#"
            SELECT id, name, slug, description, created_at
            FROM categories
            WHERE id = ANY($1)
            "#,
        )
        .bind(ids)
        .fetch_all(&self.pool)
        .await
        .map_err(map_category_db_error)?;

        Ok(rows.into_iter().map(Category::from).collect())
    }
}

fn map_category_db_error(err: sqlx::Error) -> DomainError {
    if let sqlx::Error::Database(db_err) = &err
        && db_err.code().as_deref() == Some("23505")
    {
        return DomainError::AlreadyExists("category".to_string());
    }
    DomainError::Unexpected(err.to_string())
}
