//! Entity references and key derivation.
//!
//! The registry never looks inside an entity. It only needs an opaque,
//! stable identity to derive a default key from, which is what
//! [`EntityHandle`] provides. [`Entity`] is the stock handle: a bare `u64`
//! in the same shape as the engine's entity IDs.

use serde::{Deserialize, Serialize};

/// An opaque reference to an external object that can own a registry entry.
pub trait EntityHandle: Clone + PartialEq {
    /// The identity used to derive a key when none is supplied.
    fn identity(&self) -> u64;
}

/// The stock entity reference: a game object's numeric id.
///
/// Its identity is the id itself, so the identity strategy keys an entity
/// by its id in decimal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Entity(pub u64);

impl EntityHandle for Entity {
    fn identity(&self) -> u64 {
        self.0
    }
}

/// How the registry derives a key for an entity registered without one.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum KeyStrategy {
    /// The entity's identity rendered as a decimal string.
    ///
    /// Registering the same entity twice collides, so an entity can own at
    /// most one derived key.
    #[default]
    Identity,
    /// Monotonically assigned surrogate keys of the form `{prefix}{n}`.
    Sequential {
        /// Prefix prepended to every allocated number.
        #[serde(default)]
        prefix: String,
    },
}

/// Allocates monotonically increasing surrogate keys.
///
/// Numbers start at 1 and are never handed out twice by the same allocator.
#[derive(Debug)]
pub struct KeyAllocator {
    prefix: String,
    next_id: u64,
}

impl KeyAllocator {
    /// Creates a new allocator producing keys with the given prefix.
    #[must_use]
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            next_id: 1,
        }
    }

    /// Allocates a fresh key.
    pub fn allocate(&mut self) -> String {
        let id = self.next_id;
        self.next_id += 1;
        format!("{}{id}", self.prefix)
    }
}
