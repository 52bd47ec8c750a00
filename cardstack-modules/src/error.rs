//! Error types for module operations.

use cardstack_storage::StoreError;
use thiserror::Error;
use tracing::error;

/// Result type for module operations.
pub type ModuleResult<T> = Result<T, ModuleError>;

/// Errors surfaced to callers of [`ModuleEngine`](crate::ModuleEngine).
#[derive(Debug, Error)]
pub enum ModuleError {
    /// Malformed input, bad id set, rejected payload or kind change.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// No caller identity.
    #[error("authentication required")]
    Unauthorized,

    /// The caller lacks the required role.
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// The change needs an active paid plan the card owner does not have.
    #[error("subscription required: {0}")]
    SubscriptionRequired(String),

    /// A collaborator failed. Details are logged, not returned.
    #[error("internal error: {0}")]
    Internal(String),
}

impl ModuleError {
    /// Logs a collaborator failure and hides it behind `Internal`.
    pub(crate) fn internal(operation: &str, err: StoreError) -> Self {
        error!("{} failed: {}", operation, err);
        Self::Internal(format!("{operation} failed"))
    }
}
