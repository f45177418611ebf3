//! Domain error taxonomy for the intake flow.
//!
//! All three domain variants are recoverable: the conversation engine
//! catches them and re-prompts the user. Infrastructure failures surface
//! through the `Storage` variant.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum IntakeError {
    /// A live intake session already exists for this user
    #[error("an intake session is already active for user {0}")]
    Conflict(String),

    /// No live intake session for this user (absent or expired)
    #[error("no active intake session for user {0}")]
    NotFound(String),

    /// Malformed or out-of-order input
    #[error("invalid input: {0}")]
    Validation(String),

    #[error(transparent)]
    Storage(#[from] anyhow::Error),
}

impl IntakeError {
    /// Whether the caller can recover by re-prompting the user.
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, Self::Storage(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_domain_errors_are_recoverable() {
        assert!(IntakeError::Conflict("u1".into()).is_recoverable());
        assert!(IntakeError::NotFound("u1".into()).is_recoverable());
        assert!(IntakeError::Validation("bad amount".into()).is_recoverable());
        assert!(!IntakeError::Storage(anyhow::anyhow!("io")).is_recoverable());
    }
}
