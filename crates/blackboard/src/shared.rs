//! A registry that can be shared between threads.
//!
//! [`SharedBlackboard`] offers the same operations as
//! [`Blackboard`](crate::Blackboard) behind a cloneable handle. Entries live
//! in a [`DashMap`], and since each key maps to one record holding both the
//! entity and its properties, every operation touches a single slot under
//! that slot's lock. Registration goes through the map's entry API so two
//! callers racing for the same key see exactly one winner.
//!
//! Reads return owned copies: no lock guard escapes a call.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use dashmap::DashMap;
use dashmap::mapref::entry::Entry as Slot;
use tracing::{debug, warn};

use crate::config::BlackboardConfig;
use crate::entity::{Entity, EntityHandle, KeyStrategy};
use crate::entry::Entry;
use crate::error::{BlackboardError, Result};
use crate::pattern::MatchMode;
use crate::{Key, Properties};

#[derive(Debug)]
struct Inner<E> {
    entries: DashMap<Key, Entry<E>>,
    key_strategy: KeyStrategy,
    next_id: AtomicU64,
}

/// Thread-safe registry handle. Clones share the same entries.
#[derive(Debug)]
pub struct SharedBlackboard<E = Entity> {
    inner: Arc<Inner<E>>,
}

impl<E> Clone for SharedBlackboard<E> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<E: EntityHandle> SharedBlackboard<E> {
    /// Create an empty registry using the identity key strategy.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(BlackboardConfig::default())
    }

    /// Create an empty registry from a config.
    #[must_use]
    pub fn with_config(config: BlackboardConfig) -> Self {
        Self {
            inner: Arc::new(Inner {
                entries: DashMap::with_capacity(config.initial_capacity),
                key_strategy: config.key_strategy,
                next_id: AtomicU64::new(1),
            }),
        }
    }

    /// Register a property set, optionally owned by `entity`.
    ///
    /// Same rules as [`Blackboard::register`](crate::Blackboard::register).
    ///
    /// # Errors
    ///
    /// - [`BlackboardError::InvalidArgument`] if neither a key nor an entity
    ///   is given.
    /// - [`BlackboardError::KeyCollision`] if no free key could be used.
    pub fn register(
        &self,
        entity: Option<E>,
        properties: Properties,
        key: Option<Key>,
    ) -> Result<Key> {
        let (requested, entity, properties) = match key {
            Some(key) => match self.try_insert(key, entity, properties) {
                Ok(key) => return Ok(key),
                Err((key, entity, properties)) => (Some(key), entity, properties),
            },
            None => (None, entity, properties),
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

        if let KeyStrategy::Sequential { prefix } = &self.inner.key_strategy {
            let mut slot = (Some(entity), properties);
            loop {
                let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed);
                match self.try_insert(format!("{prefix}{id}"), slot.0, slot.1) {
                    Ok(key) => return Ok(key),
                    Err((_, entity, properties)) => slot = (entity, properties),
                }
            }
        }

        let derived = entity.identity().to_string();
        self.try_insert(derived, Some(entity), properties)
            .map_err(|(key, _, _)| {
                warn!(%key, "registration rejected, derived key taken");
                BlackboardError::KeyCollision(key)
            })
    }

    /// Register a property set under `key` with no owning entity.
    ///
    /// # Errors
    ///
    /// Returns [`BlackboardError::KeyCollision`] if `key` is already
    /// registered.
    pub fn register_key(&self, key: impl Into<Key>, properties: Properties) -> Result<Key> {
        self.try_insert(key.into(), None, properties).map_err(|(key, _, _)| {
            warn!(%key, "registration rejected, key taken");
            BlackboardError::KeyCollision(key)
        })
    }

    /// Returns `true` if `key` is registered.
    #[must_use]
    pub fn exists(&self, key: &str) -> bool {
        self.inner.entries.contains_key(key)
    }

    /// Returns a copy of the property set stored under `key`.
    #[must_use]
    pub fn properties(&self, key: &str) -> Option<Properties> {
        self.inner
            .entries
            .get(key)
            .map(|entry| entry.properties().clone())
    }

    /// Returns a copy of the entity registered under `key`, if any.
    #[must_use]
    pub fn entity(&self, key: &str) -> Option<E> {
        self.inner
            .entries
            .get(key)
            .and_then(|entry| entry.entity().cloned())
    }

    /// Run `f` against the live property set of `key` while holding its
    /// lock.
    ///
    /// `f` must not call back into this registry.
    ///
    /// # Errors
    ///
    /// Returns [`BlackboardError::UnknownKey`] if `key` is not registered.
    pub fn with_properties_mut<R>(
        &self,
        key: &str,
        f: impl FnOnce(&mut Properties) -> R,
    ) -> Result<R> {
        let mut entry = self
            .inner
            .entries
            .get_mut(key)
            .ok_or_else(|| BlackboardError::UnknownKey(key.to_string()))?;
        Ok(f(entry.properties_mut()))
    }

    /// Set property `name` of `key` to `value`, inserting or overwriting.
    ///
    /// # Errors
    ///
    /// Returns [`BlackboardError::UnknownKey`] if `key` is not registered.
    pub fn update_property(
        &self,
        key: &str,
        name: impl Into<String>,
        value: impl Into<String>,
    ) -> Result<()> {
        self.with_entry_mut(key, |entry| entry.update(name, value))
    }

    /// Insert property `name` on `key` only if absent. Returns `true` if
    /// inserted.
    ///
    /// # Errors
    ///
    /// Returns [`BlackboardError::UnknownKey`] if `key` is not registered.
    pub fn add_property(
        &self,
        key: &str,
        (name, value): (impl Into<String>, impl Into<String>),
    ) -> Result<bool> {
        self.with_entry_mut(key, |entry| entry.add(name, value))
    }

    /// Remove property `name` from `key`, returning its value if it was set.
    ///
    /// # Errors
    ///
    /// Returns [`BlackboardError::UnknownKey`] if `key` is not registered.
    pub fn remove_property(&self, key: &str, name: &str) -> Result<Option<String>> {
        self.with_entry_mut(key, |entry| entry.remove(name))
    }

    /// Checks the properties of `key` against `expected`. Unknown keys
    /// never match.
    #[must_use]
    pub fn is_match(&self, key: &str, expected: &Properties, strict: bool) -> bool {
        self.matches(key, expected, MatchMode::from(strict))
    }

    /// Typed form of [`SharedBlackboard::is_match`].
    #[must_use]
    pub fn matches(&self, key: &str, expected: &Properties, mode: MatchMode) -> bool {
        self.inner
            .entries
            .get(key)
            .is_some_and(|entry| entry.matches(expected, mode))
    }

    /// Returns every key whose properties match `expected`, sorted.
    #[must_use]
    pub fn find_matches(&self, expected: &Properties, mode: MatchMode) -> Vec<Key> {
        let mut keys: Vec<Key> = self
            .inner
            .entries
            .iter()
            .filter(|item| item.value().matches(expected, mode))
            .map(|item| item.key().clone())
            .collect();
        keys.sort();
        keys
    }

    /// Remove the entry under `key`. Returns `true` if one was removed.
    pub fn remove_object(&self, key: &str) -> bool {
        self.take(key).is_some()
    }

    /// Remove and return the entry under `key`.
    pub fn take(&self, key: &str) -> Option<Entry<E>> {
        let (_, entry) = self.inner.entries.remove(key)?;
        debug!(key, "entry removed");
        Some(entry)
    }

    /// Remove every entry.
    pub fn clear(&self) {
        debug!(count = self.inner.entries.len(), "registry cleared");
        self.inner.entries.clear();
    }

    /// Returns the number of registered keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.entries.len()
    }

    /// Returns `true` if nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.entries.is_empty()
    }

    /// Returns a snapshot of all registered keys, sorted.
    #[must_use]
    pub fn keys(&self) -> Vec<Key> {
        let mut keys: Vec<Key> = self
            .inner
            .entries
            .iter()
            .map(|item| item.key().clone())
            .collect();
        keys.sort();
        keys
    }

    fn with_entry_mut<R>(&self, key: &str, f: impl FnOnce(&mut Entry<E>) -> R) -> Result<R> {
        let mut entry = self
            .inner
            .entries
            .get_mut(key)
            .ok_or_else(|| BlackboardError::UnknownKey(key.to_string()))?;
        Ok(f(entry.value_mut()))
    }

    /// Insert under `key` if free, otherwise hand everything back.
    #[allow(clippy::type_complexity)]
    fn try_insert(
        &self,
        key: Key,
        entity: Option<E>,
        properties: Properties,
    ) -> std::result::Result<Key, (Key, Option<E>, Properties)> {
        match self.inner.entries.entry(key) {
            Slot::Occupied(slot) => Err((slot.key().clone(), entity, properties)),
            Slot::Vacant(slot) => {
                let key = slot.key().clone();
                debug!(
                    %key,
                    owned = entity.is_some(),
                    properties = properties.len(),
                    "entry registered"
                );
                slot.insert(Entry::new(entity, properties));
                Ok(key)
            }
        }
    }
}

impl<E: EntityHandle> Default for SharedBlackboard<E> {
    fn default() -> Self {
        Self::new()
    }
}
