use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::error::{DomainError, FieldError, Violations};
use super::slug::slugify;

const MAX_TITLE_CHARS: usize = 100;
const MAX_EXCERPT_CHARS: usize = 200;
const MAX_COMMENT_CHARS: usize = 1000;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct Post {
    pub(crate) id: i64,
    pub(crate) title: String,
    pub(crate) slug: String,
    pub(crate) content: String,
    pub(crate) excerpt: Option<String>,
    pub(crate) author_id: i64,
    pub(crate) category_id: i64,
    pub(crate) tags: Vec<String>,
    pub(crate) is_published: bool,
    pub(crate) view_count: i64,
    pub(crate) comments: Vec<Comment>,
    pub(crate) created_at: DateTime<Utc>,
    pub(crate) updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct Comment {
    pub(crate) user_id: i64,
    pub(crate) content: String,
    pub(crate) created_at: DateTime<Utc>,
}

/// How a single post is addressed from the outside.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum PostKey {
    Id(i64),
    Slug(String),
}

impl PostKey {
    /// Positive integers are ids, everything else is a slug.
    pub(crate) fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        match raw.parse::<i64>() {
            Ok(id) if id > 0 => PostKey::Id(id),
            _ => PostKey::Slug(raw.to_lowercase()),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub(crate) struct CreatePostRequest {
    pub(crate) title: Option<String>,
    pub(crate) content: Option<String>,
    pub(crate) excerpt: Option<String>,
    pub(crate) category_id: Option<i64>,
    pub(crate) tags: Option<Vec<String>>,
    pub(crate) is_published: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct PostDraft {
    pub(crate) title: String,
    pub(crate) slug: String,
    pub(crate) content: String,
    pub(crate) excerpt: Option<String>,
    pub(crate) category_id: i64,
    pub(crate) tags: Vec<String>,
    pub(crate) is_published: bool,
}

impl CreatePostRequest {
    pub(crate) fn validate(self) -> Result<PostDraft, DomainError> {
        let mut violations = Violations::new();

        let title = match self.title.as_deref() {
            Some(title) => violations.check(normalize_title(title)),
            None => {
                violations.push("title", "is required");
                None
            }
        };
        let slug = title.as_deref().map(slugify);
        if slug.as_deref() == Some("") {
            violations.push("title", "must contain letters or digits");
        }
        let content = match self.content.as_deref() {
            Some(content) => violations.check(normalize_content(content)),
            None => {
                violations.push("content", "is required");
                None
            }
        };
        let excerpt = violations.check(normalize_excerpt(self.excerpt.as_deref()));
        let category_id = match self.category_id {
            Some(id) => violations.check(validate_category_id(id)),
            None => {
                violations.push("category", "is required");
                None
            }
        };

        let draft = match (title, slug, content, excerpt, category_id) {
            (Some(title), Some(slug), Some(content), Some(excerpt), Some(category_id)) => {
                Some(PostDraft {
                    title,
                    slug,
                    content,
                    excerpt,
                    category_id,
                    tags: normalize_tags(self.tags.unwrap_or_default()),
                    is_published: self.is_published.unwrap_or(true),
                })
            }
            _ => None,
        };
        violations.conclude(draft)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub(crate) struct UpdatePostRequest {
    pub(crate) title: Option<String>,
    pub(crate) content: Option<String>,
    /// An empty excerpt clears the stored one.
    pub(crate) excerpt: Option<String>,
    pub(crate) category_id: Option<i64>,
    pub(crate) tags: Option<Vec<String>>,
    pub(crate) is_published: Option<bool>,
}

/// Validated changes; `None` leaves the stored value as is.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct PostChanges {
    pub(crate) title: Option<String>,
    pub(crate) content: Option<String>,
    pub(crate) excerpt: Option<Option<String>>,
    pub(crate) category_id: Option<i64>,
    pub(crate) tags: Option<Vec<String>>,
    pub(crate) is_published: Option<bool>,
}

impl UpdatePostRequest {
    pub(crate) fn validate(self) -> Result<PostChanges, DomainError> {
        let mut violations = Violations::new();

        let title = self
            .title
            .as_deref()
            .and_then(|title| violations.check(normalize_title(title)));
        let content = self
            .content
            .as_deref()
            .and_then(|content| violations.check(normalize_content(content)));
        let excerpt = match self.excerpt.as_deref() {
            Some(excerpt) => violations.check(normalize_excerpt(Some(excerpt))),
            None => None,
        };
        let category_id = self
            .category_id
            .and_then(|id| violations.check(validate_category_id(id)));

        violations.finish()?;
        Ok(PostChanges {
            title,
            content,
            excerpt,
            category_id,
            tags: self.tags.map(normalize_tags),
            is_published: self.is_published,
        })
    }
}

impl PostChanges {
    /// Produces the full replacement document. Author and slug are never touched.
    pub(crate) fn apply_to(self, post: &Post) -> PostPatch {
        PostPatch {
            title: self.title.unwrap_or_else(|| post.title.clone()),
            content: self.content.unwrap_or_else(|| post.content.clone()),
            excerpt: self.excerpt.unwrap_or_else(|| post.excerpt.clone()),
            category_id: self.category_id.unwrap_or(post.category_id),
            tags: self.tags.unwrap_or_else(|| post.tags.clone()),
            is_published: self.is_published.unwrap_or(post.is_published),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct PostPatch {
    pub(crate) title: String,
    pub(crate) content: String,
    pub(crate) excerpt: Option<String>,
    pub(crate) category_id: i64,
    pub(crate) tags: Vec<String>,
    pub(crate) is_published: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub(crate) struct AddCommentRequest {
    pub(crate) content: Option<String>,
}

impl AddCommentRequest {
    pub(crate) fn validate(self) -> Result<String, DomainError> {
        let content = self.content.as_deref().map(str::trim).unwrap_or_default();
        if content.is_empty() {
            return Err(DomainError::validation("content", "is required"));
        }
        if content.chars().count() > MAX_COMMENT_CHARS {
            return Err(DomainError::validation(
                "content",
                "must be at most 1000 chars",
            ));
        }
        Ok(content.to_string())
    }
}

/// Search terms are matched literally, so the query is only trimmed.
pub(crate) fn normalize_search_query(query: Option<&str>) -> Result<String, DomainError> {
    let query = query.map(str::trim).unwrap_or_default();
    if query.is_empty() {
        return Err(DomainError::validation("q", "is required"));
    }
    Ok(query.to_string())
}

fn validate_category_id(id: i64) -> Result<i64, FieldError> {
    if id <= 0 {
        return Err(FieldError::new("category", "must be > 0"));
    }
    Ok(id)
}

fn normalize_title(title: &str) -> Result<String, FieldError> {
    let title = title.trim();
    if title.is_empty() || title.chars().count() > MAX_TITLE_CHARS {
        return Err(FieldError::new("title", "must be 1..100 chars"));
    }
    Ok(title.to_string())
}

fn normalize_content(content: &str) -> Result<String, FieldError> {
    let content = content.trim();
    if content.is_empty() {
        return Err(FieldError::new("content", "must not be empty"));
    }
    Ok(content.to_string())
}

fn normalize_excerpt(excerpt: Option<&str>) -> Result<Option<String>, FieldError> {
    let excerpt = excerpt.map(str::trim).filter(|value| !value.is_empty());
    match excerpt {
        Some(value) if value.chars().count() > MAX_EXCERPT_CHARS => {
            Err(FieldError::new("excerpt", "must be at most 200 chars"))
        }
        other => Ok(other.map(str::to_string)),
    }
}

fn normalize_tags(tags: Vec<String>) -> Vec<String> {
    let mut normalized: Vec<String> = Vec::with_capacity(tags.len());
    for tag in tags {
        let tag = tag.trim();
        if !tag.is_empty() && !normalized.iter().any(|known| known == tag) {
            normalized.push(tag.to_string());
        }
    }
    normalized
}
