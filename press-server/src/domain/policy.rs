use super::error::DomainError;
use super::user::Role;

/// Identity of the caller as resolved from the bearer token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Actor {
    pub(crate) user_id: i64,
    pub(crate) role: Role,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Access {
    Allow,
    Deny,
}

/// Only the author of a post or an admin may change it.
pub(crate) fn can_modify_post(actor: &Actor, owner_id: i64) -> Access {
    if actor.user_id == owner_id || actor.role == Role::Admin {
        Access::Allow
    } else {
        Access::Deny
    }
}

pub(crate) fn ensure_post_access(
    actor: &Actor,
    owner_id: i64,
    action: &'static str,
) -> Result<(), DomainError> {
    match can_modify_post(actor, owner_id) {
        Access::Allow => Ok(()),
        Access::Deny => Err(DomainError::Forbidden(action)),
    }
}

pub(crate) fn require_role(actor: &Actor, allowed: &[Role]) -> Result<(), DomainError> {
    if allowed.contains(&actor.role) {
        Ok(())
    } else {
        Err(DomainError::Forbidden("access this route"))
    }
}
