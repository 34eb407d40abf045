//! Registry error types.

use crate::Key;

/// Errors returned by registry mutations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BlackboardError {
    /// Neither a key nor an entity was supplied, or the key was empty.
    #[error("invalid argument: {0}")]
    InvalidArgument(&'static str),

    /// The key (explicit or derived) is already registered.
    #[error("key already registered: {0}")]
    KeyCollision(Key),

    /// The operation addressed a key that is not registered.
    #[error("unknown key: {0}")]
    UnknownKey(Key),
}

/// Convenience alias for registry results.
pub type Result<T> = std::result::Result<T, BlackboardError>;
