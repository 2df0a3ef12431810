use async_trait::async_trait;

use crate::domain::error::DomainError;
use crate::domain::post::{Comment, Post, PostDraft, PostKey, PostPatch};

#[derive(Debug, Clone)]
pub(crate) struct NewPost {
    pub(crate) draft: PostDraft,
    pub(crate) author_id: i64,
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct Pagination {
    pub(crate) page: u32,
    pub(crate) limit: u32,
}

impl Pagination {
    pub(crate) fn offset(&self) -> i64 {
        i64::from(self.page.saturating_sub(1)) * i64::from(self.limit)
    }
}

/// Listing filter; published posts only.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct PostFilter {
    pub(crate) category_id: Option<i64>,
}

/// Storage for posts. Counter increments and comment appends are single
/// atomic updates of one post row.
#[async_trait]
pub(crate) trait PostRepository: Send + Sync {
    async fn create_post(&self, input: NewPost) -> Result<Post, DomainError>;
    async fn get_post(&self, id: i64) -> Result<Option<Post>, DomainError>;
    /// Bumps `view_count` by one and returns the post as stored afterwards.
    async fn record_view(&self, key: &PostKey) -> Result<Option<Post>, DomainError>;
    async fn update_post(&self, id: i64, patch: PostPatch) -> Result<Option<Post>, DomainError>;
    async fn delete_post(&self, id: i64) -> Result<bool, DomainError>;
    /// Newest first.
    async fn list_published(
        &self,
        filter: PostFilter,
        pagination: Pagination,
    ) -> Result<Vec<Post>, DomainError>;
    async fn count_published(&self, filter: PostFilter) -> Result<i64, DomainError>;
    /// Case-insensitive substring match over title, content and excerpt; newest first.
    async fn search_published(&self, query: &str, limit: u32) -> Result<Vec<Post>, DomainError>;
    /// Returns the whole comment list after the append.
    async fn append_comment(
        &self,
        post_id: i64,
        comment: Comment,
    ) -> Result<Option<Vec<Comment>>, DomainError>;
}
