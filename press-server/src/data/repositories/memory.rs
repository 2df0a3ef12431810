use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{Duration, Utc};

use crate::data::category_repository::CategoryRepository;
use crate::data::post_repository::{NewPost, Pagination, PostFilter, PostRepository};
use crate::data::user_repository::{NewUser, UserCredentials, UserRepository};
use crate::domain::category::{Category, CategoryDraft};
use crate::domain::error::DomainError;
use crate::domain::post::{Comment, Post, PostKey, PostPatch};
use crate::domain::user::{Role, User, UserSummary};

#[derive(Default)]
struct Tables {
    users: Vec<UserCredentials>,
    categories: Vec<Category>,
    posts: Vec<Post>,
    next_id: i64,
    /// Every insert moves the clock forward so "newest first" is deterministic.
    ticks: i64,
}

impl Tables {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    fn tick(&mut self) -> chrono::DateTime<Utc> {
        self.ticks += 1;
        Utc::now() + Duration::milliseconds(self.ticks)
    }
}

/// Shared in-memory tables implementing all repository traits.
#[derive(Clone, Default)]
pub(crate) struct MemoryStore {
    tables: Arc<Mutex<Tables>>,
}

impl MemoryStore {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Tables> {
        self.tables.lock().expect("memory store mutex poisoned")
    }

    pub(crate) fn post(&self, id: i64) -> Option<Post> {
        self.lock().posts.iter().find(|post| post.id == id).cloned()
    }
}

fn matches_filter(post: &Post, filter: PostFilter) -> bool {
    post.is_published && filter.category_id.is_none_or(|id| post.category_id == id)
}

fn newest_first(posts: &mut [Post]) {
    posts.sort_by(|a, b| {
        b.created_at
            .cmp(&a.created_at)
            .then_with(|| b.id.cmp(&a.id))
    });
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn create_user(&self, input: NewUser) -> Result<User, DomainError> {
        let mut tables = self.lock();
        if tables.users.iter().any(|c| c.user.username == input.username) {
            return Err(DomainError::AlreadyExists(
                "user with this username".to_string(),
            ));
        }
        if tables.users.iter().any(|c| c.user.email == input.email) {
            return Err(DomainError::AlreadyExists("user with this email".to_string()));
        }

        let id = tables.next_id();
        let created_at = tables.tick();
        let user = User::new(id, input.username, input.email, input.role, created_at)?;
        tables.users.push(UserCredentials {
            user: user.clone(),
            password_hash: input.password_hash,
        });
        Ok(user)
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, DomainError> {
        Ok(self
            .lock()
            .users
            .iter()
            .find(|c| c.user.username == username)
            .map(|c| c.user.clone()))
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<UserCredentials>, DomainError> {
        Ok(self
            .lock()
            .users
            .iter()
            .find(|c| c.user.email == email)
            .cloned())
    }

    async fn set_role(&self, user_id: i64, role: Role) -> Result<Option<User>, DomainError> {
        let mut tables = self.lock();
        Ok(tables
            .users
            .iter_mut()
            .find(|c| c.user.id == user_id)
            .map(|c| {
                c.user.role = role;
                c.user.clone()
            }))
    }

    async fn find_summaries(&self, ids: &[i64]) -> Result<Vec<UserSummary>, DomainError> {
        Ok(self
            .lock()
            .users
            .iter()
            .filter(|c| ids.contains(&c.user.id))
            .map(|c| UserSummary {
                id: c.user.id,
                username: c.user.username.clone(),
            })
            .collect())
    }
}

#[async_trait]
impl CategoryRepository for MemoryStore {
    async fn create_category(&self, input: CategoryDraft) -> Result<Category, DomainError> {
        let mut tables = self.lock();
        if tables
            .categories
            .iter()
            .any(|c| c.name == input.name || c.slug == input.slug)
        {
            return Err(DomainError::AlreadyExists("category".to_string()));
        }

        let category = Category {
            id: tables.next_id(),
            name: input.name,
            slug: input.slug,
            description: input.description,
            created_at: tables.tick(),
        };
        tables.categories.push(category.clone());
        Ok(category)
    }

    async fn list_categories(&self) -> Result<Vec<Category>, DomainError> {
        let mut categories = self.lock().categories.clone();
        categories.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(categories)
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<Category>, DomainError> {
        Ok(self
            .lock()
            .categories
            .iter()
            .find(|c| c.slug == slug)
            .cloned())
    }

    async fn find_by_ids(&self, ids: &[i64]) -> Result<Vec<Category>, DomainError> {
        Ok(self
            .lock()
            .categories
            .iter()
            .filter(|c| ids.contains(&c.id))
            .cloned()
            .collect())
    }
}

#[async_trait]
impl PostRepository for MemoryStore {
    async fn create_post(&self, input: NewPost) -> Result<Post, DomainError> {
        let mut tables = self.lock();
        let draft = input.draft;
        if !tables.users.iter().any(|c| c.user.id == input.author_id) {
            return Err(DomainError::NotFound("author".to_string()));
        }
        if !tables.categories.iter().any(|c| c.id == draft.category_id) {
            return Err(DomainError::validation(
                "category",
                "must reference an existing category",
            ));
        }
        if tables.posts.iter().any(|p| p.slug == draft.slug) {
            return Err(DomainError::AlreadyExists(
                "post with this title".to_string(),
            ));
        }

        let now = tables.tick();
        let post = Post {
            id: tables.next_id(),
            title: draft.title,
            slug: draft.slug,
            content: draft.content,
            excerpt: draft.excerpt,
            author_id: input.author_id,
            category_id: draft.category_id,
            tags: draft.tags,
            is_published: draft.is_published,
            view_count: 0,
            comments: Vec::new(),
            created_at: now,
            updated_at: now,
        };
        tables.posts.push(post.clone());
        Ok(post)
    }

    async fn get_post(&self, id: i64) -> Result<Option<Post>, DomainError> {
        Ok(self.post(id))
    }

    async fn record_view(&self, key: &PostKey) -> Result<Option<Post>, DomainError> {
        let mut tables = self.lock();
        Ok(tables
            .posts
            .iter_mut()
            .find(|post| match key {
                PostKey::Id(id) => post.id == *id,
                PostKey::Slug(slug) => &post.slug == slug,
            })
            .map(|post| {
                post.view_count += 1;
                post.clone()
            }))
    }

    async fn update_post(&self, id: i64, patch: PostPatch) -> Result<Option<Post>, DomainError> {
        let mut tables = self.lock();
        if !tables.categories.iter().any(|c| c.id == patch.category_id) {
            return Err(DomainError::validation(
                "category",
                "must reference an existing category",
            ));
        }
        let updated_at = tables.tick();
        Ok(tables
            .posts
            .iter_mut()
            .find(|post| post.id == id)
            .map(|post| {
                post.title = patch.title;
                post.content = patch.content;
                post.excerpt = patch.excerpt;
                post.category_id = patch.category_id;
                post.tags = patch.tags;
                post.is_published = patch.is_published;
                post.updated_at = updated_at;
                post.clone()
            }))
    }

    async fn delete_post(&self, id: i64) -> Result<bool, DomainError> {
        let mut tables = self.lock();
        let before = tables.posts.len();
        tables.posts.retain(|post| post.id != id);
        Ok(tables.posts.len() < before)
    }

    async fn list_published(
        &self,
        filter: PostFilter,
        pagination: Pagination,
    ) -> Result<Vec<Post>, DomainError> {
        let mut posts: Vec<Post> = self
            .lock()
            .posts
            .iter()
            .filter(|post| matches_filter(post, filter))
            .cloned()
            .collect();
        newest_first(&mut posts);

        let offset = usize::try_from(pagination.offset()).unwrap_or(usize::MAX);
        Ok(posts
            .into_iter()
            .skip(offset)
            .take(pagination.limit as usize)
            .collect())
    }

    async fn count_published(&self, filter: PostFilter) -> Result<i64, DomainError> {
        let count = self
            .lock()
            .posts
            .iter()
            .filter(|post| matches_filter(post, filter))
            .count();
        Ok(count as i64)
    }

    async fn search_published(&self, query: &str, limit: u32) -> Result<Vec<Post>, DomainError> {
        let needle = query.to_lowercase();
        let contains = |value: &str| value.to_lowercase().contains(&needle);

        let mut posts: Vec<Post> = self
            .lock()
            .posts
            .iter()
            .filter(|post| post.is_published)
            .filter(|post| {
                contains(&post.title)
                    || contains(&post.content)
                    || post.excerpt.as_deref().is_some_and(contains)
            })
            .cloned()
            .collect();
        newest_first(&mut posts);
        posts.truncate(limit as usize);
        Ok(posts)
    }

    async fn append_comment(
        &self,
        post_id: i64,
        comment: Comment,
    ) -> Result<Option<Vec<Comment>>, DomainError> {
        let mut tables = self.lock();
        Ok(tables
            .posts
            .iter_mut()
            .find(|post| post.id == post_id)
            .map(|post| {
                post.comments.push(comment);
                post.comments.clone()
            }))
    }
}
