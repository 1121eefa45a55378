use thiserror::Error;

use crate::domain::TaskId;

/// Coarse classification of a [`SwatchError`].
///
/// A front door maps these to distinct responses. "No work right now" is not
/// here: assignment returns `Ok(None)` for that.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    InvalidState,
    UpstreamUnavailable,
    MalformedInput,
}

#[derive(Debug, Error)]
pub enum SwatchError {
    #[error("task not found: {0}")]
    NotFound(TaskId),

    #[error("invalid state: {0}")]
    InvalidState(String),

    #[error("upstream unavailable: {0}")]
    UpstreamUnavailable(String),

    #[error("malformed input: {0}")]
    MalformedInput(String),
}

impl SwatchError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            SwatchError::NotFound(_) => ErrorKind::NotFound,
            SwatchError::InvalidState(_) => ErrorKind::InvalidState,
            SwatchError::UpstreamUnavailable(_) => ErrorKind::UpstreamUnavailable,
            SwatchError::MalformedInput(_) => ErrorKind::MalformedInput,
        }
    }

    pub fn upstream(context: &str, err: impl std::fmt::Display) -> Self {
        SwatchError::UpstreamUnavailable(format!("{context}: {err}"))
    }
}
