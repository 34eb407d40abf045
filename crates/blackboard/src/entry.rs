//! The per-key record held by the registry.

use crate::Properties;
use crate::pattern::{self, MatchMode};

/// One registry entry: an optional owning entity plus its property set.
///
/// Both halves live in the same record, so an entry is created and
/// destroyed as a unit.
#[derive(Debug, Clone, PartialEq)]
pub struct Entry<E> {
    entity: Option<E>,
    properties: Properties,
}

impl<E> Entry<E> {
    /// Create an entry from an optional entity and its initial properties.
    #[must_use]
    pub fn new(entity: Option<E>, properties: Properties) -> Self {
        Self { entity, properties }
    }

    /// The owning entity, if one was registered.
    #[must_use]
    pub fn entity(&self) -> Option<&E> {
        self.entity.as_ref()
    }

    /// The stored property set.
    #[must_use]
    pub fn properties(&self) -> &Properties {
        &self.properties
    }

    /// Mutable access to the stored property set.
    pub fn properties_mut(&mut self) -> &mut Properties {
        &mut self.properties
    }

    /// Set `name` to `value`, inserting or overwriting.
    pub fn update(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.properties.insert(name.into(), value.into());
    }

    /// Insert `name` only if absent. Returns `true` if it was inserted.
    pub fn add(&mut self, name: impl Into<String>, value: impl Into<String>) -> bool {
        match self.properties.entry(name.into()) {
            std::collections::hash_map::Entry::Occupied(_) => false,
            std::collections::hash_map::Entry::Vacant(slot) => {
                slot.insert(value.into());
                true
            }
        }
    }

    /// Remove `name`, returning its previous value.
    pub fn remove(&mut self, name: &str) -> Option<String> {
        self.properties.remove(name)
    }

    /// Checks the stored properties against a pattern.
    #[must_use]
    pub fn matches(&self, expected: &Properties, mode: MatchMode) -> bool {
        pattern::matches(&self.properties, expected, mode)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Entity;

    #[test]
    fn test_add_does_not_overwrite() {
        let mut entry: Entry<Entity> = Entry::new(None, Properties::new());
        assert!(entry.add("state", "idle"));
        assert!(!entry.add("state", "alert"));
        assert_eq!(entry.properties()["state"], "idle");
    }

    #[test]
    fn test_update_overwrites() {
        let mut entry = Entry::new(Some(Entity(7)), Properties::new());
        entry.update("state", "idle");
        entry.update("state", "alert");
        assert_eq!(entry.properties()["state"], "alert");
        assert_eq!(entry.entity(), Some(&Entity(7)));
    }

    #[test]
    fn test_remove_returns_previous_value() {
        let mut entry: Entry<Entity> = Entry::new(None, Properties::new());
        entry.update("hp", "10");
        assert_eq!(entry.remove("hp").as_deref(), Some("10"));
        assert_eq!(entry.remove("hp"), None);
    }
}
