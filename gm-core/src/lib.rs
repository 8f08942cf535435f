//! # gm-core
//!
//! Session-state core for a tabletop-RPG game-master table: encounter turn
//! order, event-history archiving, and character minds.
//!
//! Three groups of functionality:
//!
//! - **Initiative** — advance an encounter's turn pointer, wrapping over the
//!   ordered participant list, and record the transition in the history log.
//! - **Archive** — move past history events out of the active log into
//!   long-term storage, partitioned by a time cutoff.
//! - **Mind** — attach, detach, and relocate thoughts on a character, each
//!   with affinity/knowledge scores and a MEMORY/ACTIVE location tag.
//!
//! The domain logic is pure (`(record, input) -> new record + event`); the
//! [`store`] module keeps records in SQLite with per-row version counters,
//! and the [`ops`] module ties the two together as conditional
//! read-modify-write cycles, so concurrent writers cannot silently overwrite
//! each other.
//!
//! Record field names on the wire (`currentIndex`, `archivedEvents`,
//! `thoughtId`, ...) are a compatibility surface with the existing record
//! store and must not change; fields owned by other services round-trip
//! untouched.

#![deny(clippy::unwrap_used)]
#![deny(missing_docs)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod archive;
pub mod character;
pub mod config;
pub mod encounter;
pub mod error;
pub mod initiative;
pub mod mind;
pub mod ops;
pub mod store;
pub mod types;

pub use character::{Character, MindEntry, MindLocation};
pub use config::GmConfig;
pub use encounter::{Combatant, Encounter, HistoryEvent, Initiative};
pub use error::GmError;
pub use store::{SessionStore, Versioned};
pub use types::*;
