use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, info};

use crate::data::category_repository::CategoryRepository;
use crate::data::post_repository::{NewPost, Pagination, PostFilter, PostRepository};
use crate::data::user_repository::UserRepository;
use crate::domain::category::Category;
use crate::domain::error::DomainError;
use crate::domain::policy::{Actor, ensure_post_access};
use crate::domain::post::{
    AddCommentRequest, Comment, CreatePostRequest, Post, PostKey, UpdatePostRequest,
    normalize_search_query,
};
use crate::domain::user::UserSummary;

pub(crate) const SEARCH_RESULT_LIMIT: u32 = 20;

/// A post with its author, category and comment authors resolved.
#[derive(Debug, Clone)]
pub(crate) struct PostView {
    pub(crate) post: Post,
    pub(crate) author: Option<UserSummary>,
    pub(crate) category: Option<Category>,
    pub(crate) comments: Vec<CommentView>,
}

#[derive(Debug, Clone)]
pub(crate) struct CommentView {
    pub(crate) user: Option<UserSummary>,
    pub(crate) content: String,
    pub(crate) created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub(crate) struct ListPostsResult {
    pub(crate) posts: Vec<PostView>,
    pub(crate) page: u32,
    pub(crate) limit: u32,
    pub(crate) total: i64,
    pub(crate) pages: u32,
}

pub(crate) struct BlogService {
    posts: Arc<dyn PostRepository>,
    categories: Arc<dyn CategoryRepository>,
    users: Arc<dyn UserRepository>,
}

impl BlogService {
    pub(crate) fn new(
        posts: Arc<dyn PostRepository>,
        categories: Arc<dyn CategoryRepository>,
        users: Arc<dyn UserRepository>,
    ) -> Self {
        Self {
            posts,
            categories,
            users,
        }
    }

    pub(crate) async fn list_posts(
        &self,
        page: u32,
        limit: u32,
        category_slug: Option<&str>,
    ) -> Result<ListPostsResult, DomainError> {
        let filter = self.resolve_filter(category_slug).await?;
        let pagination = Pagination { page, limit };

        let posts = self.posts.list_published(filter, pagination).await?;
        let total = self.posts.count_published(filter).await?;

        Ok(ListPostsResult {
            posts: self.populate(posts).await?,
            page,
            limit,
            total,
            pages: page_count(total, limit),
        })
    }

    /// Looks the post up by id or slug and counts the view.
    pub(crate) async fn get_post(&self, id_or_slug: &str) -> Result<PostView, DomainError> {
        let key = PostKey::parse(id_or_slug);
        let mut post = self.posts.record_view(&key).await?;

        // числовой ключ может оказаться слагом ("2024")
        if post.is_none() && matches!(key, PostKey::Id(_)) {
            let slug = PostKey::Slug(id_or_slug.trim().to_lowercase());
            post = self.posts.record_view(&slug).await?;
        }

        let post = post.ok_or_else(|| DomainError::NotFound("post".to_string()))?;
        self.populate_one(post).await
    }

    pub(crate) async fn create_post(
        &self,
        actor: &Actor,
        req: CreatePostRequest,
    ) -> Result<PostView, DomainError> {
        let draft = req.validate()?;
        self.ensure_category_exists(draft.category_id).await?;

        let post = self
            .posts
            .create_post(NewPost {
                draft,
                author_id: actor.user_id,
            })
            .await?;
        info!(post_id = post.id, author_id = actor.user_id, "post created");

        self.populate_one(post).await
    }

    pub(crate) async fn update_post(
        &self,
        actor: &Actor,
        post_id: i64,
        req: UpdatePostRequest,
    ) -> Result<PostView, DomainError> {
        let existing = self.find_post(post_id).await?;
        ensure_post_access(actor, existing.author_id, "update this post")?;

        let changes = req.validate()?;
        if let Some(category_id) = changes.category_id {
            self.ensure_category_exists(category_id).await?;
        }

        let patch = changes.apply_to(&existing);
        let post = self
            .posts
            .update_post(post_id, patch)
            .await?
            .ok_or_else(|| DomainError::NotFound("post".to_string()))?;
        info!(post_id, actor_id = actor.user_id, "post updated");

        self.populate_one(post).await
    }

    pub(crate) async fn delete_post(&self, actor: &Actor, post_id: i64) -> Result<(), DomainError> {
        let existing = self.find_post(post_id).await?;
        ensure_post_access(actor, existing.author_id, "delete this post")?;

        let deleted = self.posts.delete_post(post_id).await?;
        if !deleted {
            return Err(DomainError::NotFound("post".to_string()));
        }
        info!(post_id, actor_id = actor.user_id, "post deleted");
        Ok(())
    }

    pub(crate) async fn add_comment(
        &self,
        actor: &Actor,
        post_id: i64,
        req: AddCommentRequest,
    ) -> Result<Vec<CommentView>, DomainError> {
        let content = req.validate()?;
        let comment = Comment {
            user_id: actor.user_id,
            content,
            created_at: Utc::now(),
        };

        let comments = self
            .posts
            .append_comment(post_id, comment)
            .await?
            .ok_or_else(|| DomainError::NotFound("post".to_string()))?;

        let ids: Vec<i64> = comments.iter().map(|comment| comment.user_id).collect();
        let users = self.user_index(ids).await?;
        Ok(comment_views(comments, &users))
    }

    pub(crate) async fn search_posts(&self, query: Option<&str>) -> Result<Vec<PostView>, DomainError> {
        let query = normalize_search_query(query)?;
        let posts = self
            .posts
            .search_published(&query, SEARCH_RESULT_LIMIT)
            .await?;
        self.populate(posts).await
    }

    async fn find_post(&self, post_id: i64) -> Result<Post, DomainError> {
        self.posts
            .get_post(post_id)
            .await?
            .ok_or_else(|| DomainError::NotFound("post".to_string()))
    }

    async fn resolve_filter(&self, category_slug: Option<&str>) -> Result<PostFilter, DomainError> {
        let Some(slug) = category_slug.map(str::trim).filter(|slug| !slug.is_empty()) else {
            return Ok(PostFilter::default());
        };

        match self.categories.find_by_slug(&slug.to_lowercase()).await? {
            Some(category) => Ok(PostFilter {
                category_id: Some(category.id),
            }),
            None => {
                debug!(slug, "unknown category slug, listing all published posts");
                Ok(PostFilter::default())
            }
        }
    }

    async fn ensure_category_exists(&self, category_id: i64) -> Result<(), DomainError> {
        let found = self.categories.find_by_ids(&[category_id]).await?;
        if found.is_empty() {
            return Err(DomainError::validation(
                "category",
                "must reference an existing category",
            ));
        }
        Ok(())
    }

    async fn populate_one(&self, post: Post) -> Result<PostView, DomainError> {
        self.populate(vec![post])
            .await?
            .pop()
            .ok_or_else(|| DomainError::Unexpected("populated post is missing".to_string()))
    }

    async fn populate(&self, posts: Vec<Post>) -> Result<Vec<PostView>, DomainError> {
        let user_ids = posts
            .iter()
            .flat_map(|post| {
                std::iter::once(post.author_id)
                    .chain(post.comments.iter().map(|comment| comment.user_id))
            })
            .collect();
        let category_ids = dedup(posts.iter().map(|post| post.category_id).collect());

        let users = self.user_index(user_ids).await?;
        let categories: HashMap<i64, Category> = self
            .categories
            .find_by_ids(&category_ids)
            .await?
            .into_iter()
            .map(|category| (category.id, category))
            .collect();

        Ok(posts
            .into_iter()
            .map(|mut post| {
                let comments = comment_views(std::mem::take(&mut post.comments), &users);
                PostView {
                    author: users.get(&post.author_id).cloned(),
                    category: categories.get(&post.category_id).cloned(),
                    comments,
                    post,
                }
            })
            .collect())
    }

    async fn user_index(&self, ids: Vec<i64>) -> Result<HashMap<i64, UserSummary>, DomainError> {
        let ids = dedup(ids);
        Ok(self
            .users
            .find_summaries(&ids)
            .await?
            .into_iter()
            .map(|user| (user.id, user))
            .collect())
    }
}

pub(crate) fn page_count(total: i64, limit: u32) -> u32 {
    if total <= 0 || limit == 0 {
        return 0;
    }
    let limit = i64::from(limit);
    u32::try_from((total + limit - 1) / limit).unwrap_or(u32::MAX)
}

fn comment_views(comments: Vec<Comment>, users: &HashMap<i64, UserSummary>) -> Vec<CommentView> {
    comments
        .into_iter()
        .map(|comment| CommentView {
            user: users.get(&comment.user_id).cloned(),
            content: comment.content,
            created_at: comment.created_at,
        })
        .collect()
}

fn dedup(mut ids: Vec<i64>) -> Vec<i64> {
    ids.sort_unstable();
    ids.dedup();
    ids
}
