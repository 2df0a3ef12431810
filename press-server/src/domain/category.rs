use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::error::{DomainError, FieldError, Violations};
use super::slug::slugify;

const MAX_NAME_CHARS: usize = 50;
const MAX_DESCRIPTION_CHARS: usize = 200;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct Category {
    pub(crate) id: i64,
    pub(crate) name: String,
    pub(crate) slug: String,
    pub(crate) description: Option<String>,
    pub(crate) created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub(crate) struct CreateCategoryRequest {
    pub(crate) name: Option<String>,
    pub(crate) description: Option<String>,
}

/// A category payload that passed validation, with its slug derived.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct CategoryDraft {
    pub(crate) name: String,
    pub(crate) slug: String,
    pub(crate) description: Option<String>,
}

impl CreateCategoryRequest {
    pub(crate) fn validate(self) -> Result<CategoryDraft, DomainError> {
        let mut violations = Violations::new();
        let name = violations.check(normalize_name(self.name.as_deref()));
        let description = violations.check(normalize_description(self.description.as_deref()));

        let draft = match (name, description) {
            (Some((name, slug)), Some(description)) => Some(CategoryDraft {
                name,
                slug,
                description,
            }),
            _ => None,
        };
        violations.conclude(draft)
    }
}

fn normalize_name(name: Option<&str>) -> Result<(String, String), FieldError> {
    let name = name.map(str::trim).unwrap_or_default();
    if name.is_empty() {
        return Err(FieldError::new("name", "is required"));
    }
    if name.chars().count() > MAX_NAME_CHARS {
        return Err(FieldError::new("name", "must be at most 50 chars"));
    }
    let slug = slugify(name);
    if slug.is_empty() {
        return Err(FieldError::new("name", "must contain letters or digits"));
    }
    Ok((name.to_string(), slug))
}

fn normalize_description(description: Option<&str>) -> Result<Option<String>, FieldError> {
    let description = description.map(str::trim).filter(|value| !value.is_empty());
    match description {
        Some(value) if value.chars().count() > MAX_DESCRIPTION_CHARS => Err(FieldError::new(
            "description",
            "must be at most 200 chars",
        )),
        other => Ok(other.map(str::to_string)),
    }
}

#[cfg(test)]
mod tests {
    use super::CreateCategoryRequest;
    use crate::domain::error::DomainError;

    #[test]
    fn create_category_derives_slug() {
        let draft = CreateCategoryRequest {
            name: Some("  Tech  ".to_string()),
            description: None,
        }
        .validate()
        .expect("must validate");

        assert_eq!(draft.name, "Tech");
        assert_eq!(draft.slug, "tech");
        assert_eq!(draft.description, None);
    }

    #[test]
    fn create_category_requires_name() {
        let err = CreateCategoryRequest::default()
            .validate()
            .expect_err("missing name must fail");
        match err {
            DomainError::Validation(errors) => assert_eq!(errors[0].field, "name"),
            _ => panic!("expected DomainError::Validation"),
        }
    }

    #[test]
    fn create_category_rejects_long_description() {
        let err = CreateCategoryRequest {
            name: Some("Rust".to_string()),
            description: Some("x".repeat(201)),
        }
        .validate()
        .expect_err("long description must fail");
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[test]
    fn blank_description_is_dropped() {
        let draft = CreateCategoryRequest {
            name: Some("Rust".to_string()),
            description: Some("   ".to_string()),
        }
        .validate()
        .expect("must validate");
        assert_eq!(draft.description, None);
    }
}
