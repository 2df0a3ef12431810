use async_trait::async_trait;

use crate::domain::category::{Category, CategoryDraft};
use crate::domain::error::DomainError;

#[async_trait]
pub(crate) trait CategoryRepository: Send + Sync {
    async fn create_category(&self, input: CategoryDraft) -> Result<Category, DomainError>;
    /// Sorted by name.
    async fn list_categories(&self) -> Result<Vec<Category>, DomainError>;
    async fn find_by_slug(&self, slug: &str) -> Result<Option<Category>, DomainError>;
    async fn find_by_ids(&self, ids: &[i64]) -> Result<Vec<Category>, DomainError>;
}
