// crates/gifer-core/src/error.rs

use thiserror::Error;

/// Rejection raised by the parameter model and the geometry helpers.
///
/// Always recoverable: the caller keeps its previous state and shows the
/// message to the user.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParamError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

impl ParamError {
    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        ParamError::InvalidInput(msg.into())
    }
}
