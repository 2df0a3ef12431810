use std::fmt;

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct FieldError {
    pub(crate) field: &'static str,
    pub(crate) message: &'static str,
}

impl FieldError {
    pub(crate) fn new(field: &'static str, message: &'static str) -> Self {
        Self { field, message }
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.field, self.message)
    }
}

#[derive(Debug, Error)]
pub(crate) enum DomainError {
    #[error("{}", join_field_errors(.0))]
    Validation(Vec<FieldError>),

    #[error("{0} not found")]
    NotFound(String),

    #[error("{0} already exists")]
    AlreadyExists(String),

    #[error("not authorized to {0}")]
    Forbidden(&'static str),

    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("{0}")]
    Unexpected(String),
}

impl DomainError {
    pub(crate) fn validation(field: &'static str, message: &'static str) -> Self {
        Self::Validation(vec![FieldError::new(field, message)])
    }
}

fn join_field_errors(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Collects every field violation of a payload instead of stopping at the first one.
#[derive(Debug, Default)]
pub(crate) struct Violations(Vec<FieldError>);

impl Violations {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push(&mut self, field: &'static str, message: &'static str) {
        self.0.push(FieldError::new(field, message));
    }

    /// Records the error (if any) and hands back the valid value.
    pub(crate) fn check<T>(&mut self, result: Result<T, FieldError>) -> Option<T> {
        match result {
            Ok(value) => Some(value),
            Err(err) => {
                self.0.push(err);
                None
            }
        }
    }

    pub(crate) fn finish(self) -> Result<(), DomainError> {
        self.conclude(Some(()))
    }

    /// `value` is expected to be `Some` whenever no violation was recorded.
    pub(crate) fn conclude<T>(self, value: Option<T>) -> Result<T, DomainError> {
        if !self.0.is_empty() {
            return Err(DomainError::Validation(self.0));
        }
        value.ok_or_else(|| DomainError::Unexpected("validated value is missing".to_string()))
    }
}
