//! Engine-level errors.

use thiserror::Error;

/// Failure constructing or reconfiguring an [`AccessEngine`](crate::AccessEngine).
#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Policy(#[from] sentra_policy::PolicyError),
}
