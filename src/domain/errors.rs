use thiserror::Error;

/// Errors surfaced by a document store implementation. Absence is not an
/// error at this seam: `get` returns `Option` and deleting an absent key
/// is a no-op, so everything left is unexpected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("{0}")]
    Unexpected(String),
}

impl StoreError {
    pub fn unexpected(message: impl Into<String>) -> Self {
        StoreError::Unexpected(message.into())
    }
}
