//! Policy errors.

use thiserror::Error;

/// Errors from rule loading and validation.
#[derive(Debug, Error)]
pub enum PolicyError {
    /// The rule file could not be read or parsed.
    #[error("failed to load rules from '{path}': {message}")]
    LoadFailed { path: String, message: String },

    /// A rule failed structural validation.
    #[error("invalid rule '{name}': {message}")]
    InvalidRule { name: String, message: String },
}

pub type Result<T> = std::result::Result<T, PolicyError>;
