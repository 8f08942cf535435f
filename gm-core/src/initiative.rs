//! Turn advancement over an encounter's initiative order.
//!
//! Split into a planning step and an applying step so that the store and the
//! best-effort name lookup stay at the operation boundary: planning only
//! reads the record, applying mutates it with names already resolved.

use crate::encounter::{Encounter, HistoryEvent};
use crate::error::{GmError, Result};
use crate::types::{CharacterId, EncounterId};

/// A planned turn transition: who yields, who acts next, and where the
/// pointer lands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TurnChange {
    /// The character whose turn is ending.
    pub previous: CharacterId,
    /// The character whose turn is starting.
    pub next: CharacterId,
    /// New value for `current_index`, wrapped modulo the order length.
    pub next_index: usize,
}

/// Compute the next turn transition without mutating the encounter.
///
/// Wraps past the end of the order back to index 0. A stored pointer that is
/// somehow out of range still wraps into range, so a single advance repairs
/// it rather than failing.
///
/// # Errors
///
/// Returns [`GmError::MissingInitiativeOrder`] if the encounter has no
/// initiative or its order is empty.
pub fn plan_advance(encounter: &Encounter, encounter_id: &EncounterId) -> Result<TurnChange> {
    let initiative = encounter
        .initiative
        .as_ref()
        .filter(|i| !i.order.is_empty())
        .ok_or_else(|| GmError::MissingInitiativeOrder(encounter_id.clone()))?;

    let len = initiative.order.len();
    let current = initiative.current_index.min(len - 1);
    let next_index = (current + 1) % len;

    Ok(TurnChange {
        previous: initiative.order[current].character_id.clone(),
        next: initiative.order[next_index].character_id.clone(),
        next_index,
    })
}

/// Apply a planned transition: move the pointer and append the
/// `INITIATIVE_ADVANCED` history event, timestamped with the encounter's
/// current clock.
///
/// `previous_name` / `next_name` are already-resolved display names (or
/// placeholders when resolution degraded).
pub fn apply_advance(
    encounter: &mut Encounter,
    change: TurnChange,
    previous_name: &str,
    next_name: &str,
) {
    let description = format!("Initiative passes from {previous_name} to {next_name}.");
    let event = HistoryEvent::initiative_advanced(
        encounter.current_time,
        change.previous,
        change.next,
        description,
    );

    if let Some(initiative) = encounter.initiative.as_mut() {
        initiative.current_index = change.next_index;
    }
    encounter.history.push(event);
}
