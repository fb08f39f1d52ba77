//! Shared primitives for all Rust crates in Bunkerdesk.

#![forbid(unsafe_code)]

/// Acting-identity primitives shared across services.
pub mod actor;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use actor::Actor;

/// Result type used across Bunkerdesk crates.
pub type AppResult<T> = Result<T, AppError>;

/// A validated non-empty UTF-8 string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NonEmptyString(String);

impl NonEmptyString {
    /// Creates a validated non-empty string.
    pub fn new(value: impl Into<String>) -> AppResult<Self> {
        let value = value.into();
        if value.trim().is_empty() {
            return Err(AppError::Validation(
                "value must not be empty or whitespace".to_owned(),
            ));
        }

        Ok(Self(value))
    }

    /// Returns the underlying string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl From<NonEmptyString> for String {
    fn from(value: NonEmptyString) -> Self {
        value.0
    }
}

/// Common application error categories.
#[derive(Debug, Error)]
pub enum AppError {
    /// Invalid input or violated invariant.
    #[error("validation error: {0}")]
    Validation(String),

    /// Requested record is absent or already soft-deleted.
    #[error("not found: {0}")]
    NotFound(String),

    /// Write operation conflicts with existing state.
    #[error("conflict: {0}")]
    Conflict(String),

    /// Sequence counter creation or increment failed.
    #[error("allocation failed: {0}")]
    Allocation(String),

    /// Underlying persistence failure.
    #[error("persistence error: {0}")]
    Persistence(String),
}
