use async_trait::async_trait;

use crate::domain::error::DomainError;
use crate::domain::user::{Role, User, UserSummary};

#[derive(Debug, Clone)]
pub(crate) struct UserCredentials {
    pub(crate) user: User,
    pub(crate) password_hash: String,
}

#[derive(Debug, Clone)]
pub(crate) struct NewUser {
    pub(crate) username: String,
    pub(crate) email: String,
    pub(crate) password_hash: String,
    pub(crate) role: Role,
}

#[async_trait]
pub(crate) trait UserRepository: Send + Sync {
    async fn create_user(&self, input: NewUser) -> Result<User, DomainError>;
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, DomainError>;
    async fn find_by_email(&self, email: &str) -> Result<Option<UserCredentials>, DomainError>;
    async fn set_role(&self, user_id: i64, role: Role) -> Result<Option<User>, DomainError>;
    /// Unknown ids are skipped.
    async fn find_summaries(&self, ids: &[i64]) -> Result<Vec<UserSummary>, DomainError>;
}
