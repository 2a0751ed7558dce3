//! Shared storage error vocabulary used by every repository trait.

/// Error enumeration for repository failures.
///
/// `Conflict` carries the message the unique constraint would surface, so
/// handlers can report which field collided without re-querying.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("{0}")]
    Conflict(String),
    #[error("record not found")]
    NotFound,
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

impl StoreError {
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict(message.into())
    }
}
