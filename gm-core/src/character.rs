//! The persisted character record and its mind — the list of attached
//! thoughts with per-thought affinity/knowledge scores and a location tag.
//!
//! As with encounters, wire field names are the store schema and unknown
//! fields (stats, inventory, portrait, ...) pass through untouched.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::types::ThoughtId;

/// Where a thought currently sits in a character's mind.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MindLocation {
    /// Stored away; not influencing play.
    #[default]
    Memory,
    /// Held actively; in play.
    Active,
}

impl fmt::Display for MindLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Memory => f.write_str("MEMORY"),
            Self::Active => f.write_str("ACTIVE"),
        }
    }
}

/// One attached thought in a character's mind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MindEntry {
    /// The attached thought.
    pub thought_id: ThoughtId,
    /// How strongly the character feels about the thought.
    #[serde(default)]
    pub affinity: f64,
    /// How much the character knows about the thought.
    #[serde(default)]
    pub knowledge: f64,
    /// Where the thought sits.
    #[serde(default)]
    pub location: MindLocation,
}

impl MindEntry {
    /// A freshly attached thought: zero scores, stored in memory.
    #[must_use]
    pub fn new(thought_id: ThoughtId) -> Self {
        Self {
            thought_id,
            affinity: 0.0,
            knowledge: 0.0,
            location: MindLocation::Memory,
        }
    }
}

/// A persisted character: one row in the backing store.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Character {
    /// Display name, used when rendering history descriptions.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Attached thoughts. `thought_id` is unique within this list.
    #[serde(default)]
    pub mind: Vec<MindEntry>,
    /// Fields owned by out-of-scope resolvers, preserved verbatim.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Character {
    /// Create a character with a display name and an empty mind.
    #[must_use]
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }
}
