//! Registry configuration.

use serde::{Deserialize, Serialize};

use crate::entity::KeyStrategy;

/// Configuration for a [`Blackboard`](crate::Blackboard) or
/// [`SharedBlackboard`](crate::SharedBlackboard).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BlackboardConfig {
    /// How keys are derived for entities registered without one.
    pub key_strategy: KeyStrategy,
    /// Number of entries to reserve space for up front.
    pub initial_capacity: usize,
}

impl BlackboardConfig {
    /// Create a config with the default identity key strategy.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Override the key strategy.
    #[must_use]
    pub fn with_key_strategy(mut self, strategy: KeyStrategy) -> Self {
        self.key_strategy = strategy;
        self
    }

    /// Reserve space for `capacity` entries.
    #[must_use]
    pub fn with_initial_capacity(mut self, capacity: usize) -> Self {
        self.initial_capacity = capacity;
        self
    }
}
