//! Domain-level errors (no external dependencies)

use thiserror::Error;

/// Domain errors represent invariant violations on domain values.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("environment name cannot be empty or whitespace")]
    BlankEnvironmentName,
}
