use std::sync::Arc;

use tracing::info;

use crate::data::category_repository::CategoryRepository;
use crate::domain::category::{Category, CreateCategoryRequest};
use crate::domain::error::DomainError;

pub(crate) struct CategoryService {
    repo: Arc<dyn CategoryRepository>,
}

impl CategoryService {
    pub(crate) fn new(repo: Arc<dyn CategoryRepository>) -> Self {
        Self { repo }
    }

    pub(crate) async fn list_categories(&self) -> Result<Vec<Category>, DomainError> {
        self.repo.list_categories().await
    }

    pub(crate) async fn create_category(
        &self,
        req: CreateCategoryRequest,
    ) -> Result<Category, DomainError> {
        let draft = req.validate()?;

        if self.repo.find_by_slug(&draft.slug).await?.is_some() {
            return Err(DomainError::AlreadyExists("category".to_string()));
        }

        let category = self.repo.create_category(draft).await?;
        info!(category_id = category.id, slug = %category.slug, "category created");
        Ok(category)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::CategoryService;
    use crate::data::repositories::memory::MemoryStore;
    use crate::domain::category::CreateCategoryRequest;
    use crate::domain::error::DomainError;

    fn request(name: &str) -> CreateCategoryRequest {
        CreateCategoryRequest {
            name: Some(name.to_string()),
            description: None,
        }
    }

    #[tokio::test]
    async fn create_category_stores_slug() {
        let service = CategoryService::new(Arc::new(MemoryStore::new()));

        let category = service
            .create_category(request("Tech"))
            .await
            .expect("create must succeed");
        assert_eq!(category.name, "Tech");
        assert_eq!(category.slug, "tech");
    }

    #[tokio::test]
    async fn create_category_rejects_duplicate_slug() {
        let service = CategoryService::new(Arc::new(MemoryStore::new()));
        service
            .create_category(request("Tech"))
            .await
            .expect("first create must succeed");

        let err = service
            .create_category(request("  tech "))
            .await
            .expect_err("duplicate must fail");
        assert!(matches!(err, DomainError::AlreadyExists(_)));
    }

    #[tokio::test]
    async fn list_categories_is_sorted_by_name() {
        let service = CategoryService::new(Arc::new(MemoryStore::new()));
        for name in ["Travel", "Art", "Music"] {
            service
                .create_category(request(name))
                .await
                .expect("create must succeed");
        }

        let names: Vec<_> = service
            .list_categories()
            .await
            .expect("list must succeed")
            .into_iter()
            .map(|category| category.name)
            .collect();
        assert_eq!(names, vec!["Art", "Music", "Travel"]);
    }
}
