//! Error types for the gm-core library.

use thiserror::Error;

use crate::types::{CharacterId, EncounterId, ThoughtId};

/// Top-level error type for all gm-core operations.
#[derive(Error, Debug)]
pub enum GmError {
    /// No encounter record exists for the given id.
    #[error("Encounter not found: {0}")]
    EncounterNotFound(EncounterId),

    /// No character record exists for the given id.
    #[error("Character not found: {0}")]
    CharacterNotFound(CharacterId),

    /// The encounter has no initiative order, so turn advancement is undefined.
    #[error("Encounter {0} has no initiative order to advance")]
    MissingInitiativeOrder(EncounterId),

    /// The thought is already attached to this character's mind.
    #[error("Thought {thought_id} is already attached to character {character_id}")]
    ThoughtAlreadyAttached {
        /// The character whose mind was being modified.
        character_id: CharacterId,
        /// The duplicate thought.
        thought_id: ThoughtId,
    },

    /// The thought is not attached to this character's mind.
    #[error("Thought {thought_id} is not attached to character {character_id}")]
    ThoughtNotAttached {
        /// The character whose mind was being modified.
        character_id: CharacterId,
        /// The missing thought.
        thought_id: ThoughtId,
    },

    /// A conditional write lost the race: the record changed since it was read.
    #[error("Write conflict on {entity} {id}: version {read_version} was superseded")]
    VersionConflict {
        /// Kind of record ("encounter" or "character").
        entity: &'static str,
        /// Id of the contested record.
        id: String,
        /// The version the losing writer had read.
        read_version: u64,
    },

    /// SQLite persistence error.
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Serialization or deserialization failure.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Generic I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience Result type alias.
pub type Result<T> = std::result::Result<T, GmError>;
