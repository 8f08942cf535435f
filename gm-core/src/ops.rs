//! The public session-state operations.
//!
//! Every operation is one read-modify-write cycle: load the versioned
//! record, apply the pure mutation from [`crate::initiative`],
//! [`crate::archive`], or [`crate::mind`], and save conditionally on the
//! version read. A lost race re-reads and re-applies the mutation, up to
//! `OpsConfig::max_write_attempts` times, then surfaces
//! [`GmError::VersionConflict`]. Everything else is terminal on first error.

use tracing::{debug, warn};

use crate::archive;
use crate::character::{Character, MindLocation};
use crate::config::OpsConfig;
use crate::encounter::Encounter;
use crate::error::{GmError, Result};
use crate::initiative;
use crate::mind;
use crate::store::{SessionStore, Versioned};
use crate::types::{CharacterId, EncounterId, GameTime, ThoughtId};

/// Advance the encounter's turn pointer by one position, wrapping past the
/// end of the initiative order, and append an `INITIATIVE_ADVANCED` history
/// event describing the transition.
///
/// Display names for the description are resolved best-effort: a failed or
/// empty lookup logs a warning and substitutes the configured placeholder,
/// never aborting the advance.
///
/// Not idempotent — calling twice advances twice.
///
/// # Errors
///
/// [`GmError::EncounterNotFound`] if the encounter does not exist,
/// [`GmError::MissingInitiativeOrder`] if it has no usable order,
/// [`GmError::VersionConflict`] if every write attempt lost a race, or a
/// store error.
pub fn advance_initiative(
    store: &SessionStore,
    config: &OpsConfig,
    encounter_id: &EncounterId,
) -> Result<Encounter> {
    update_encounter(store, config, encounter_id, |encounter| {
        let change = initiative::plan_advance(encounter, encounter_id)?;
        let previous_name = resolve_combatant_name(store, config, &change.previous);
        let next_name = resolve_combatant_name(store, config, &change.next);
        initiative::apply_advance(encounter, change, &previous_name, &next_name);
        Ok(())
    })
}

/// Move all history events at or before the cutoff into the encounter's
/// archive. The cutoff defaults to the encounter's own clock. Events without
/// a usable timestamp always stay active.
///
/// Idempotent in effect for a fixed cutoff.
///
/// # Errors
///
/// [`GmError::EncounterNotFound`] if the encounter does not exist,
/// [`GmError::VersionConflict`] if every write attempt lost a race, or a
/// store error.
pub fn archive_events(
    store: &SessionStore,
    config: &OpsConfig,
    encounter_id: &EncounterId,
    up_to: Option<GameTime>,
) -> Result<Encounter> {
    update_encounter(store, config, encounter_id, |encounter| {
        let outcome = archive::archive_up_to(encounter, up_to);
        debug!(
            encounter = %encounter_id,
            moved = outcome.moved,
            "archived past events"
        );
        Ok(())
    })
}

/// Attach a thought to the character's mind with zero scores, located in
/// MEMORY.
///
/// # Errors
///
/// [`GmError::CharacterNotFound`] if the character does not exist,
/// [`GmError::ThoughtAlreadyAttached`] if the thought is already attached,
/// [`GmError::VersionConflict`] if every write attempt lost a race, or a
/// store error.
pub fn attach_thought(
    store: &SessionStore,
    config: &OpsConfig,
    character_id: &CharacterId,
    thought_id: &ThoughtId,
) -> Result<Character> {
    update_character(store, config, character_id, |character| {
        mind::attach(character, character_id, thought_id.clone())
    })
}

/// Detach a thought from the character's mind, discarding its scores.
///
/// # Errors
///
/// [`GmError::CharacterNotFound`] if the character does not exist,
/// [`GmError::ThoughtNotAttached`] if the thought is not attached,
/// [`GmError::VersionConflict`] if every write attempt lost a race, or a
/// store error.
pub fn detach_thought(
    store: &SessionStore,
    config: &OpsConfig,
    character_id: &CharacterId,
    thought_id: &ThoughtId,
) -> Result<Character> {
    update_character(store, config, character_id, |character| {
        mind::detach(character, character_id, thought_id)
    })
}

/// Move a thought between MEMORY and ACTIVE, preserving its scores.
///
/// # Errors
///
/// [`GmError::CharacterNotFound`] if the character does not exist,
/// [`GmError::ThoughtNotAttached`] if the thought is not attached,
/// [`GmError::VersionConflict`] if every write attempt lost a race, or a
/// store error.
pub fn move_thought(
    store: &SessionStore,
    config: &OpsConfig,
    character_id: &CharacterId,
    thought_id: &ThoughtId,
    to: MindLocation,
) -> Result<Character> {
    update_character(store, config, character_id, |character| {
        mind::relocate(character, character_id, thought_id, to)
    })
}

// ---------------------------------------------------------------------------
// Read-modify-write plumbing
// ---------------------------------------------------------------------------

fn update_encounter<F>(
    store: &SessionStore,
    config: &OpsConfig,
    encounter_id: &EncounterId,
    mut mutate: F,
) -> Result<Encounter>
where
    F: FnMut(&mut Encounter) -> Result<()>,
{
    let attempts = config.max_write_attempts.max(1);
    let mut attempt = 0;
    loop {
        attempt += 1;
        let Some(Versioned {
            record: mut encounter,
            version,
        }) = store.load_encounter(encounter_id)?
        else {
            return Err(GmError::EncounterNotFound(encounter_id.clone()));
        };

        mutate(&mut encounter)?;

        match store.save_encounter(encounter_id, &encounter, version) {
            Ok(_) => return Ok(encounter),
            Err(GmError::VersionConflict { .. }) if attempt < attempts => {
                warn!(
                    encounter = %encounter_id,
                    attempt,
                    "encounter changed under us; re-reading"
                );
            }
            Err(e) => return Err(e),
        }
    }
}

fn update_character<F>(
    store: &SessionStore,
    config: &OpsConfig,
    character_id: &CharacterId,
    mut mutate: F,
) -> Result<Character>
where
    F: FnMut(&mut Character) -> Result<()>,
{
    let attempts = config.max_write_attempts.max(1);
    let mut attempt = 0;
    loop {
        attempt += 1;
        let Some(Versioned {
            record: mut character,
            version,
        }) = store.load_character(character_id)?
        else {
            return Err(GmError::CharacterNotFound(character_id.clone()));
        };

        mutate(&mut character)?;

        match store.save_character(character_id, &character, version) {
            Ok(_) => return Ok(character),
            Err(GmError::VersionConflict { .. }) if attempt < attempts => {
                warn!(
                    character = %character_id,
                    attempt,
                    "character changed under us; re-reading"
                );
            }
            Err(e) => return Err(e),
        }
    }
}

/// Best-effort display-name lookup for history descriptions.
///
/// Lookup failures must not abort the operation that needs the name, so
/// every degraded path warns and falls back to the configured placeholder.
fn resolve_combatant_name(
    store: &SessionStore,
    config: &OpsConfig,
    character_id: &CharacterId,
) -> String {
    match store.load_character(character_id) {
        Ok(Some(versioned)) => match versioned.record.name {
            Some(name) if !name.is_empty() => return name,
            _ => warn!(
                character = %character_id,
                "combatant has no display name; using placeholder"
            ),
        },
        Ok(None) => warn!(
            character = %character_id,
            "combatant record missing during name lookup; using placeholder"
        ),
        Err(error) => warn!(
            character = %character_id,
            %error,
            "combatant name lookup failed; using placeholder"
        ),
    }
    config.unknown_combatant_name.clone()
}
