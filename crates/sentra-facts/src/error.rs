//! Provider and resolver errors.

use thiserror::Error;

/// Failure reported by a single fact provider.
///
/// Transient variants (`Timeout`, `Unavailable`, `Cancelled`) let the
/// provider chain fall through to the next source; `NotFound` is
/// authoritative and stops the chain.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ProviderError {
    /// The directory answered and the entity does not exist.
    #[error("entity not found: {0}")]
    NotFound(String),

    /// The provider did not answer within its deadline.
    #[error("provider '{provider}' timed out after {elapsed_ms}ms")]
    Timeout { provider: String, elapsed_ms: u64 },

    /// The provider could not be reached or answered with a fault.
    #[error("provider '{provider}' unavailable: {message}")]
    Unavailable { provider: String, message: String },

    /// The overall resolution deadline expired before this call started.
    #[error("fact resolution cancelled: deadline exceeded")]
    Cancelled,
}

impl ProviderError {
    /// Whether the next provider in the chain should be tried.
    pub fn is_transient(&self) -> bool {
        !matches!(self, ProviderError::NotFound(_))
    }
}

/// Failure of a full resolution pass.
///
/// Transient provider trouble never surfaces here; the resolver degrades
/// instead. Only an authoritative miss on a required entity is an error.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ResolveError {
    #[error("entity not found: {0}")]
    EntityNotFound(String),
}
