//! The single-threaded registry.
//!
//! A [`Blackboard`] maps string keys to [`Entry`] records. Collaborators
//! post property sets under a key, optionally tied to an owning entity, and
//! any other collaborator can read, update, or pattern-match them later.
//!
//! Registration is first-writer-wins: a key that is already taken is never
//! overwritten.

use std::collections::HashMap;

use tracing::{debug, warn};

use crate::config::BlackboardConfig;
use crate::entity::{Entity, EntityHandle, KeyAllocator, KeyStrategy};
use crate::entry::Entry;
use crate::error::{BlackboardError, Result};
use crate::pattern::MatchMode;
use crate::{Key, Properties};

/// In-memory tuple-space registry.
#[derive(Debug)]
pub struct Blackboard<E = Entity> {
    /// Entries keyed by their registry key.
    entries: HashMap<Key, Entry<E>>,
    /// Derivation rule for entities registered without a key.
    key_strategy: KeyStrategy,
    /// Surrogate key source, used by [`KeyStrategy::Sequential`].
    allocator: KeyAllocator,
}

impl<E: EntityHandle> Blackboard<E> {
    /// Create an empty registry using the identity key strategy.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(BlackboardConfig::default())
    }

    /// Create an empty registry from a config.
    #[must_use]
    pub fn with_config(config: BlackboardConfig) -> Self {
        let prefix = match &config.key_strategy {
            KeyStrategy::Sequential { prefix } => prefix.clone(),
            KeyStrategy::Identity => String::new(),
        };
        Self {
            entries: HashMap::with_capacity(config.initial_capacity),
            key_strategy: config.key_strategy,
            allocator: KeyAllocator::new(prefix),
        }
    }

    /// Register a property set, optionally owned by `entity`.
    ///
    /// When `key` is supplied and free, the entry is stored under it.
    /// Otherwise a key is derived from `entity` according to the configured
    /// [`KeyStrategy`].
    ///
    /// # Errors
    ///
    /// - [`BlackboardError::InvalidArgument`] if neither a key nor an entity
    ///   is given.
    /// - [`BlackboardError::KeyCollision`] if the supplied key is taken and
    ///   there is no entity to derive another from, or if the derived key is
    ///   taken.
    pub fn register(
        &mut self,
        entity: Option<E>,
        properties: Properties,
        key: Option<Key>,
    ) -> Result<Key> {
        let requested = match key {
            Some(key) if !self.entries.contains_key(&key) => {
                return Ok(self.insert(key, entity, properties));
            }
            other => other,
        };

        let Some(entity) = entity else {
            return match requested {
                Some(key) => {
                    warn!(%key, "registration rejected, key taken");
                    Err(BlackboardError::KeyCollision(key))
                }
                None => Err(BlackboardError::InvalidArgument(
                    "register requires a key or an entity",
                )),
            };
        };

        let derived = self.derive_key(&entity);
        if self.entries.contains_key(&derived) {
            warn!(key = %derived, "registration rejected, derived key taken");
            return Err(BlackboardError::KeyCollision(derived));
        }
        Ok(self.insert(derived, Some(entity), properties))
    }

    /// Register a property set under `key` with no owning entity.
    ///
    /// # Errors
    ///
    /// Returns [`BlackboardError::KeyCollision`] if `key` is already
    /// registered.
    pub fn register_key(&mut self, key: impl Into<Key>, properties: Properties) -> Result<Key> {
        let key = key.into();
        if self.entries.contains_key(&key) {
            warn!(%key, "registration rejected, key taken");
            return Err(BlackboardError::KeyCollision(key));
        }
        Ok(self.insert(key, None, properties))
    }

    /// Returns `true` if `key` is registered.
    #[must_use]
    pub fn exists(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Returns the live property set stored under `key`.
    #[must_use]
    pub fn properties(&self, key: &str) -> Option<&Properties> {
        self.entries.get(key).map(Entry::properties)
    }

    /// Returns mutable access to the property set stored under `key`.
    ///
    /// Changes made through the returned reference are registry state.
    pub fn properties_mut(&mut self, key: &str) -> Option<&mut Properties> {
        self.entries.get_mut(key).map(Entry::properties_mut)
    }

    /// Returns the entity registered under `key`, if any.
    #[must_use]
    pub fn entity(&self, key: &str) -> Option<&E> {
        self.entries.get(key).and_then(Entry::entity)
    }

    /// Returns the key `entity` is registered under.
    ///
    /// An entity registered under several explicit keys owns all of them;
    /// the lexicographically smallest is returned.
    #[must_use]
    pub fn key_of(&self, entity: &E) -> Option<&Key> {
        self.entries
            .iter()
            .filter(|(_, entry)| entry.entity() == Some(entity))
            .map(|(key, _)| key)
            .min()
    }

    /// Set property `name` of `key` to `value`, inserting or overwriting.
    ///
    /// # Errors
    ///
    /// Returns [`BlackboardError::UnknownKey`] if `key` is not registered.
    pub fn update_property(
        &mut self,
        key: &str,
        name: impl Into<String>,
        value: impl Into<String>,
    ) -> Result<()> {
        let entry = self.entry_mut(key)?;
        entry.update(name, value);
        Ok(())
    }

    /// Insert property `name` on `key` only if it is not already present.
    ///
    /// Returns `true` if the property was inserted, `false` if the name was
    /// already taken (its value is left untouched).
    ///
    /// # Errors
    ///
    /// Returns [`BlackboardError::UnknownKey`] if `key` is not registered.
    pub fn add_property(
        &mut self,
        key: &str,
        (name, value): (impl Into<String>, impl Into<String>),
    ) -> Result<bool> {
        let entry = self.entry_mut(key)?;
        Ok(entry.add(name, value))
    }

    /// Remove property `name` from `key`, returning its value if it was set.
    ///
    /// # Errors
    ///
    /// Returns [`BlackboardError::UnknownKey`] if `key` is not registered.
    pub fn remove_property(&mut self, key: &str, name: &str) -> Result<Option<String>> {
        let entry = self.entry_mut(key)?;
        Ok(entry.remove(name))
    }

    /// Checks the properties of `key` against `expected`.
    ///
    /// With `strict` the stored set must contain exactly the expected pairs;
    /// otherwise extra stored properties are allowed. Unknown keys never
    /// match.
    #[must_use]
    pub fn is_match(&self, key: &str, expected: &Properties, strict: bool) -> bool {
        self.matches(key, expected, MatchMode::from(strict))
    }

    /// Typed form of [`Blackboard::is_match`].
    #[must_use]
    pub fn matches(&self, key: &str, expected: &Properties, mode: MatchMode) -> bool {
        self.entries
            .get(key)
            .is_some_and(|entry| entry.matches(expected, mode))
    }

    /// Returns every key whose properties match `expected`, sorted.
    #[must_use]
    pub fn find_matches(&self, expected: &Properties, mode: MatchMode) -> Vec<&Key> {
        let mut keys: Vec<&Key> = self
            .entries
            .iter()
            .filter(|(_, entry)| entry.matches(expected, mode))
            .map(|(key, _)| key)
            .collect();
        keys.sort();
        keys
    }

    /// Remove the entry under `key`, entity and properties together.
    ///
    /// Returns `true` if an entry was removed.
    pub fn remove_object(&mut self, key: &str) -> bool {
        self.take(key).is_some()
    }

    /// Remove and return the entry under `key`.
    pub fn take(&mut self, key: &str) -> Option<Entry<E>> {
        let entry = self.entries.remove(key);
        if entry.is_some() {
            debug!(key, "entry removed");
        }
        entry
    }

    /// Remove every entry.
    pub fn clear(&mut self) {
        debug!(count = self.entries.len(), "registry cleared");
        self.entries.clear();
    }

    /// Returns the number of registered keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns an iterator over all registered keys, in arbitrary order.
    pub fn keys(&self) -> impl Iterator<Item = &Key> {
        self.entries.keys()
    }

    fn entry_mut(&mut self, key: &str) -> Result<&mut Entry<E>> {
        self.entries
            .get_mut(key)
            .ok_or_else(|| BlackboardError::UnknownKey(key.to_string()))
    }

    fn derive_key(&mut self, entity: &E) -> Key {
        if self.key_strategy == KeyStrategy::Identity {
            return entity.identity().to_string();
        }
        loop {
            let key = self.allocator.allocate();
            if !self.entries.contains_key(&key) {
                return key;
            }
        }
    }

    fn insert(&mut self, key: Key, entity: Option<E>, properties: Properties) -> Key {
        debug!(
            %key,
            owned = entity.is_some(),
            properties = properties.len(),
            "entry registered"
        );
        self.entries.insert(key.clone(), Entry::new(entity, properties));
        key
    }
}

impl<E: EntityHandle> Default for Blackboard<E> {
    fn default() -> Self {
        Self::new()
    }
}
