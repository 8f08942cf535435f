//! The persisted encounter record: initiative order, turn pointer, and the
//! active / archived event history logs.
//!
//! Field names on the wire are the store's de-facto schema and must stay
//! stable (`currentIndex`, `currentTime`, `archivedEvents`, `type`, ...).
//! Fields owned by other resolvers — encounter names, monster rosters,
//! whatever the table grows next — are preserved verbatim through every
//! read-modify-write cycle via the flattened `extra` map.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::types::{CharacterId, GameTime};

/// Event kind recorded when the turn pointer advances.
pub const INITIATIVE_ADVANCED: &str = "INITIATIVE_ADVANCED";

// ---------------------------------------------------------------------------
// Initiative
// ---------------------------------------------------------------------------

/// One participant slot in the initiative order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Combatant {
    /// The character taking this slot.
    pub character_id: CharacterId,
}

/// The turn sequence for an encounter: an ordered participant list and a
/// pointer to whose turn it currently is.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Initiative {
    /// Participants in turn order.
    #[serde(default)]
    pub order: Vec<Combatant>,
    /// Index into `order` of the character whose turn it is.
    #[serde(default)]
    pub current_index: usize,
}

impl Initiative {
    /// Build an initiative order from character ids, starting at index 0.
    #[must_use]
    pub fn from_order<I>(characters: I) -> Self
    where
        I: IntoIterator<Item = CharacterId>,
    {
        Self {
            order: characters
                .into_iter()
                .map(|character_id| Combatant { character_id })
                .collect(),
            current_index: 0,
        }
    }
}

// ---------------------------------------------------------------------------
// History events
// ---------------------------------------------------------------------------

/// A timestamped record of something that happened during an encounter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEvent {
    /// When the event happened, on the encounter's clock.
    ///
    /// Held as the raw stored value: rows written by older clients carry
    /// strings and nulls here, and those must survive write-back untouched.
    /// [`usable_time`](Self::usable_time) is the parsed view; an event
    /// without a finite numeric time is never eligible for archiving.
    #[serde(
        default,
        deserialize_with = "raw_time",
        skip_serializing_if = "Option::is_none"
    )]
    pub time: Option<Value>,
    /// Event kind tag (e.g. [`INITIATIVE_ADVANCED`]).
    #[serde(rename = "type")]
    pub kind: String,
    /// Human-readable description for the session log.
    #[serde(default)]
    pub description: String,
    /// For turn events: whose turn just ended.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous_character_id: Option<CharacterId>,
    /// For turn events: whose turn is starting.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_character_id: Option<CharacterId>,
    /// Event-specific fields owned by other producers, preserved verbatim.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl HistoryEvent {
    /// Build the event recorded by one turn advancement.
    #[must_use]
    pub fn initiative_advanced(
        time: GameTime,
        previous: CharacterId,
        next: CharacterId,
        description: String,
    ) -> Self {
        Self {
            time: Some(Value::from(time.0)),
            kind: INITIATIVE_ADVANCED.to_string(),
            description,
            previous_character_id: Some(previous),
            next_character_id: Some(next),
            extra: Map::new(),
        }
    }

    /// The event's timestamp, if it has one usable for cutoff comparisons:
    /// a finite numeric `time` value.
    #[must_use]
    pub fn usable_time(&self) -> Option<GameTime> {
        self.time
            .as_ref()
            .and_then(Value::as_f64)
            .filter(|t| t.is_finite())
            .map(GameTime)
    }
}

/// Keep whatever is stored under `time`, nulls and junk included.
///
/// The field is only `None` when absent from the row entirely, so write-back
/// reproduces exactly what was read.
fn raw_time<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

// ---------------------------------------------------------------------------
// Encounter record
// ---------------------------------------------------------------------------

/// A persisted encounter: one row in the backing store.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Encounter {
    /// Turn order and pointer. Absent until combat starts.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub initiative: Option<Initiative>,
    /// The encounter's clock; the default archive cutoff.
    #[serde(default)]
    pub current_time: GameTime,
    /// Not-yet-archived events, in the order they were recorded.
    #[serde(default)]
    pub history: Vec<HistoryEvent>,
    /// Events moved out of the active log, oldest first.
    #[serde(default)]
    pub archived_events: Vec<HistoryEvent>,
    /// Fields owned by out-of-scope resolvers, preserved verbatim.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Encounter {
    /// Create an empty encounter at the given clock value.
    #[must_use]
    pub fn new(current_time: GameTime) -> Self {
        Self {
            current_time,
            ..Self::default()
        }
    }
}
