use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::ValidateEmail;

use super::error::{DomainError, FieldError, Violations};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub(crate) enum Role {
    #[default]
    User,
    Admin,
}

impl Role {
    pub(crate) fn as_str(self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Admin => "admin",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = DomainError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "user" => Ok(Role::User),
            "admin" => Ok(Role::Admin),
            other => Err(DomainError::Unexpected(format!("unknown role: {other}"))),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct RegisterRequest {
    pub(crate) username: String,
    pub(crate) email: String,
    pub(crate) password: String,
}

impl RegisterRequest {
    pub(crate) fn validate(self) -> Result<Self, DomainError> {
        let mut violations = Violations::new();
        let username = violations.check(normalize_register_username(&self.username));
        let email = violations.check(normalize_email(&self.email));
        let password_len = self.password.chars().count();
        if !(8..=128).contains(&password_len) {
            violations.push("password", "must be 8..128 chars");
        }

        let validated = match (username, email) {
            (Some(username), Some(email)) => Some(Self {
                username,
                email,
                password: self.password,
            }),
            _ => None,
        };
        violations.conclude(validated)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct LoginRequest {
    pub(crate) email: String,
    pub(crate) password: String,
}

impl LoginRequest {
    pub(crate) fn validate(self) -> Result<Self, DomainError> {
        let email = self.email.trim().to_lowercase();
        if email.is_empty() {
            return Err(DomainError::validation("email", "must not be empty"));
        }
        if self.password.is_empty() {
            return Err(DomainError::validation("password", "must not be empty"));
        }
        Ok(Self {
            email,
            password: self.password,
        })
    }
}

#[derive(Debug, Clone)]
pub(crate) struct User {
    pub(crate) id: i64,
    pub(crate) username: String,
    pub(crate) email: String,
    pub(crate) role: Role,
    pub(crate) created_at: DateTime<Utc>,
}

impl User {
    pub(crate) fn new(
        id: i64,
        username: impl Into<String>,
        email: impl Into<String>,
        role: Role,
        created_at: DateTime<Utc>,
    ) -> Result<Self, DomainError> {
        if id <= 0 {
            return Err(DomainError::validation("id", "must be > 0"));
        }
        let username = normalize_register_username(&username.into())
            .map_err(|err| DomainError::Validation(vec![err]))?;
        let email =
            normalize_email(&email.into()).map_err(|err| DomainError::Validation(vec![err]))?;

        Ok(Self {
            id,
            username,
            email,
            role,
            created_at,
        })
    }
}

/// Public part of a user shown next to posts and comments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct UserSummary {
    pub(crate) id: i64,
    pub(crate) username: String,
}

fn normalize_register_username(username: &str) -> Result<String, FieldError> {
    let username = username.trim();
    let len = username.chars().count();
    if !(3..=64).contains(&len) {
        return Err(FieldError::new("username", "must be 3..64 chars"));
    }
    Ok(username.to_string())
}

fn normalize_email(email: &str) -> Result<String, FieldError> {
    let email = email.trim().to_lowercase();
    if !email.validate_email() {
        return Err(FieldError::new("email", "must be a valid email"));
    }
    Ok(email)
}

#[cfg(test)]
mod tests {
    use super::{LoginRequest, RegisterRequest, Role, User, normalize_email, normalize_register_username};
    use crate::domain::error::DomainError;
    use chrono::Utc;

    #[test]
    fn user_new_rejects_non_positive_id() {
        let result = User::new(0, "valid_user", "test@example.com", Role::User, Utc::now());
        assert!(result.is_err());
    }

    #[test]
    fn normalize_email_trims_and_lowercases() {
        let value = normalize_email("  TeSt@Example.COM ").expect("must be valid");
        assert_eq!(value, "test@example.com");
    }

    #[test]
    fn register_username_rules_are_applied() {
        assert!(normalize_register_username("ab").is_err());
        assert!(normalize_register_username("valid_user").is_ok());
    }

    #[test]
    fn register_password_length_is_checked() {
        let short = RegisterRequest {
            username: "valid_user".to_string(),
            email: "test@example.com".to_string(),
            password: "short".to_string(),
        };
        assert!(short.validate().is_err());

        let ok = RegisterRequest {
            username: "valid_user".to_string(),
            email: "test@example.com".to_string(),
            password: "very-secure-password".to_string(),
        };
        let validated = ok.validate().expect("must be valid");
        assert_eq!(validated.username, "valid_user");
        assert_eq!(validated.email, "test@example.com");
    }

    #[test]
    fn register_reports_every_invalid_field() {
        let req = RegisterRequest {
            username: "x".to_string(),
            email: "not-an-email".to_string(),
            password: "short".to_string(),
        };

        match req.validate() {
            Err(DomainError::Validation(errors)) => {
                let fields: Vec<_> = errors.iter().map(|err| err.field).collect();
                assert_eq!(fields, vec!["username", "email", "password"]);
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn login_request_normalizes_email() {
        let req = LoginRequest {
            email: "  USER@Example.com ".to_string(),
            password: "secret".to_string(),
        };
        let validated = req.validate().expect("must be valid");
        assert_eq!(validated.email, "user@example.com");
    }

    #[test]
    fn role_round_trips_through_its_name() {
        assert_eq!("admin".parse::<Role>().expect("known role"), Role::Admin);
        assert_eq!(Role::User.as_str(), "user");
        assert!("root".parse::<Role>().is_err());
    }
}
