//! Core identifier and time types shared across the session-state system.
//!
//! Records in the backing store are keyed by caller-supplied string ids
//! (the API layer mints them), so the id newtypes wrap `String` rather than
//! a binary UUID. Freshly generated ids are still v4 UUIDs in string form.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Identity Types
// ---------------------------------------------------------------------------

/// Unique identifier for an encounter.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EncounterId(pub String);

/// Unique identifier for a character.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CharacterId(pub String);

/// Unique identifier for a thought attached to a character's mind.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ThoughtId(pub String);

macro_rules! string_id {
    ($name:ident) => {
        impl $name {
            /// Generate a fresh random id (v4 UUID in string form).
            #[must_use]
            pub fn new() -> Self {
                Self(Uuid::new_v4().to_string())
            }

            /// View the id as a string slice.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_owned())
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }
    };
}

string_id!(EncounterId);
string_id!(CharacterId);
string_id!(ThoughtId);

// ---------------------------------------------------------------------------
// Time
// ---------------------------------------------------------------------------

/// In-game clock value for an encounter.
///
/// The clock is an opaque monotonically increasing number owned by the
/// encounter record; event timestamps and archive cutoffs use the same scale.
#[derive(Debug, Clone, Copy, Default, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GameTime(pub f64);

impl GameTime {
    /// Whether this time can participate in cutoff comparisons.
    /// NaN and infinities are unusable.
    #[must_use]
    pub fn is_usable(self) -> bool {
        self.0.is_finite()
    }
}

impl fmt::Display for GameTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_ids_are_unique() {
        assert_ne!(EncounterId::new(), EncounterId::new());
        assert_ne!(CharacterId::new(), CharacterId::new());
    }

    #[test]
    fn ids_serialize_as_plain_strings() {
        let id = CharacterId::from("char-42");
        let json = serde_json::to_string(&id).expect("serialize");
        assert_eq!(json, "\"char-42\"");
    }

    #[test]
    fn game_time_usability() {
        assert!(GameTime(0.0).is_usable());
        assert!(GameTime(-3.5).is_usable());
        assert!(!GameTime(f64::NAN).is_usable());
        assert!(!GameTime(f64::INFINITY).is_usable());
    }
}
