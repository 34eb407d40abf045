//! # blackboard
//!
//! An in-memory tuple space. Collaborators post named property sets under a
//! string key, optionally owned by an entity, and any other collaborator can
//! read, update, or pattern-match them without direct coupling.
//!
//! This crate provides:
//!
//! - [`Blackboard`] — the single-threaded registry.
//! - [`SharedBlackboard`] — a cloneable, thread-safe registry handle.
//! - [`Entry`] — the per-key record (entity plus properties).
//! - [`EntityHandle`] / [`Entity`] — opaque entity references.
//! - [`MatchMode`] — subset or exact pattern matching.
//! - [`BlackboardConfig`] — key derivation and capacity settings.
//!
//! ## Usage
//!
//! ```rust
//! use blackboard::{Blackboard, Properties};
//!
//! let mut board: Blackboard = Blackboard::new();
//! let mut props = Properties::new();
//! props.insert("state".to_string(), "idle".to_string());
//!
//! board.register(None, props, Some("npc1".to_string())).unwrap();
//! board.update_property("npc1", "state", "alert").unwrap();
//!
//! let mut expected = Properties::new();
//! expected.insert("state".to_string(), "alert".to_string());
//! assert!(board.is_match("npc1", &expected, true));
//! ```

use std::collections::HashMap;

pub mod blackboard;
pub mod config;
pub mod entity;
pub mod entry;
pub mod error;
pub mod pattern;
pub mod shared;

pub use blackboard::Blackboard;
pub use config::BlackboardConfig;
pub use entity::{Entity, EntityHandle, KeyAllocator, KeyStrategy};
pub use entry::Entry;
pub use error::{BlackboardError, Result};
pub use pattern::MatchMode;
pub use shared::SharedBlackboard;

/// A registry key.
pub type Key = String;

/// A property set: property name to property value.
pub type Properties = HashMap<String, String>;
