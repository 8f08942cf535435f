//! Pure operations on a character's mind list: attach, detach, relocate.
//!
//! One mind entry moves through three states: absent → attached in MEMORY
//! (always with zero scores), MEMORY ↔ ACTIVE via relocation, and back to
//! absent via detach. Scores do not survive a detach; re-attaching starts
//! from zero again.

use crate::character::{Character, MindEntry, MindLocation};
use crate::error::{GmError, Result};
use crate::types::{CharacterId, ThoughtId};

/// Attach a thought to the character's mind.
///
/// The new entry starts with zero affinity and knowledge, located in MEMORY.
///
/// # Errors
///
/// Returns [`GmError::ThoughtAlreadyAttached`] if the thought is already in
/// the mind; the list is left unchanged.
pub fn attach(
    character: &mut Character,
    character_id: &CharacterId,
    thought_id: ThoughtId,
) -> Result<()> {
    if character.mind.iter().any(|e| e.thought_id == thought_id) {
        return Err(GmError::ThoughtAlreadyAttached {
            character_id: character_id.clone(),
            thought_id,
        });
    }
    character.mind.push(MindEntry::new(thought_id));
    Ok(())
}

/// Detach a thought from the character's mind, discarding its scores.
///
/// # Errors
///
/// Returns [`GmError::ThoughtNotAttached`] if the thought is not in the
/// mind; the list is left unchanged.
pub fn detach(
    character: &mut Character,
    character_id: &CharacterId,
    thought_id: &ThoughtId,
) -> Result<()> {
    let index = position(character, character_id, thought_id)?;
    character.mind.remove(index);
    Ok(())
}

/// Move a thought to the given location, preserving its scores.
///
/// Relocating to the location the thought already occupies is a no-op, not
/// an error.
///
/// # Errors
///
/// Returns [`GmError::ThoughtNotAttached`] if the thought is not in the
/// mind; the list is left unchanged.
pub fn relocate(
    character: &mut Character,
    character_id: &CharacterId,
    thought_id: &ThoughtId,
    to: MindLocation,
) -> Result<()> {
    let index = position(character, character_id, thought_id)?;
    character.mind[index].location = to;
    Ok(())
}

fn position(
    character: &Character,
    character_id: &CharacterId,
    thought_id: &ThoughtId,
) -> Result<usize> {
    character
        .mind
        .iter()
        .position(|e| &e.thought_id == thought_id)
        .ok_or_else(|| GmError::ThoughtNotAttached {
            character_id: character_id.clone(),
            thought_id: thought_id.clone(),
        })
}
