use serde::{Deserialize, Serialize};

use crate::{AppError, AppResult};

/// Acting identity attached to every mutating request.
///
/// Authentication itself happens upstream; the API only receives the
/// already-verified subject identifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    subject: String,
}

impl Actor {
    /// Creates an actor from the authenticated subject claim.
    pub fn new(subject: impl Into<String>) -> AppResult<Self> {
        let subject = subject.into();
        if subject.trim().is_empty() {
            return Err(AppError::Validation(
                "actor subject must not be empty".to_owned(),
            ));
        }

        Ok(Self { subject })
    }

    /// Returns the stable subject identifier.
    #[must_use]
    pub fn subject(&self) -> &str {
        self.subject.as_str()
    }
}
