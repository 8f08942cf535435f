//! Moving past events out of an encounter's active history log into its
//! archive, partitioned by a time cutoff.
//!
//! Partition rule: `time <= cutoff` is archived, `time > cutoff` stays
//! active, and events with no usable time always stay active — an event the
//! system cannot date must never silently disappear into the archive.

use crate::encounter::Encounter;
use crate::types::GameTime;

/// Result summary of one archive pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArchiveOutcome {
    /// How many events moved from the active log to the archive.
    pub moved: usize,
    /// The cutoff that was applied.
    pub cutoff_applied: bool,
}

/// Move every active event with a usable `time <= cutoff` into the archive,
/// preserving relative order in both lists. The cutoff defaults to the
/// encounter's own clock.
///
/// Idempotent for a fixed cutoff: a second pass finds nothing left to move
/// (unless new qualifying events were appended in between).
pub fn archive_up_to(encounter: &mut Encounter, cutoff: Option<GameTime>) -> ArchiveOutcome {
    let cutoff = cutoff.unwrap_or(encounter.current_time);
    if !cutoff.is_usable() {
        // A NaN cutoff compares false against everything; nothing would move.
        return ArchiveOutcome {
            moved: 0,
            cutoff_applied: false,
        };
    }

    let mut remaining = Vec::with_capacity(encounter.history.len());
    let mut moved = 0;
    for event in encounter.history.drain(..) {
        match event.usable_time() {
            Some(time) if time <= cutoff => {
                encounter.archived_events.push(event);
                moved += 1;
            }
            _ => remaining.push(event),
        }
    }
    encounter.history = remaining;

    ArchiveOutcome {
        moved,
        cutoff_applied: true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encounter::HistoryEvent;
    use serde_json::{Map, Value};

    fn note(time: Option<f64>, label: &str) -> HistoryEvent {
        HistoryEvent {
            time: time.map(Value::from),
            kind: "NOTE".to_string(),
            description: label.to_string(),
            previous_character_id: None,
            next_character_id: None,
            extra: Map::new(),
        }
    }

    fn labels(events: &[HistoryEvent]) -> Vec<&str> {
        events.iter().map(|e| e.description.as_str()).collect()
    }

    #[test]
    fn partitions_by_cutoff_preserving_order() {
        let mut encounter = Encounter::new(GameTime(100.0));
        encounter.history = vec![
            note(Some(1.0), "first"),
            note(Some(50.0), "second"),
            note(Some(51.0), "late"),
            note(Some(10.0), "third"),
        ];

        let outcome = archive_up_to(&mut encounter, Some(GameTime(50.0)));
        assert_eq!(outcome.moved, 3);
        assert_eq!(labels(&encounter.archived_events), ["first", "second", "third"]);
        assert_eq!(labels(&encounter.history), ["late"]);
    }

    #[test]
    fn default_cutoff_is_the_encounter_clock() {
        let mut encounter = Encounter::new(GameTime(25.0));
        encounter.history = vec![note(Some(25.0), "now"), note(Some(26.0), "soon")];

        archive_up_to(&mut encounter, None);
        assert_eq!(labels(&encounter.archived_events), ["now"], "boundary is inclusive");
        assert_eq!(labels(&encounter.history), ["soon"]);
    }

    #[test]
    fn undatable_events_stay_active() {
        let mut encounter = Encounter::new(GameTime(1000.0));
        encounter.history = vec![
            note(None, "undated"),
            note(Some(f64::NAN), "nan"),
            note(Some(5.0), "dated"),
        ];

        let outcome = archive_up_to(&mut encounter, None);
        assert_eq!(outcome.moved, 1);
        assert_eq!(labels(&encounter.history), ["undated", "nan"]);
        assert_eq!(labels(&encounter.archived_events), ["dated"]);
    }

    #[test]
    fn second_pass_with_same_cutoff_moves_nothing() {
        let mut encounter = Encounter::new(GameTime(10.0));
        encounter.history = vec![note(Some(3.0), "a"), note(Some(30.0), "b")];

        assert_eq!(archive_up_to(&mut encounter, Some(GameTime(10.0))).moved, 1);
        assert_eq!(archive_up_to(&mut encounter, Some(GameTime(10.0))).moved, 0);
        assert_eq!(labels(&encounter.archived_events), ["a"]);
        assert_eq!(labels(&encounter.history), ["b"]);
    }

    #[test]
    fn rerun_picks_up_newly_appended_events() {
        let mut encounter = Encounter::new(GameTime(10.0));
        encounter.history = vec![note(Some(3.0), "a")];
        archive_up_to(&mut encounter, Some(GameTime(10.0)));

        encounter.history.push(note(Some(4.0), "latecomer"));
        let outcome = archive_up_to(&mut encounter, Some(GameTime(10.0)));
        assert_eq!(outcome.moved, 1);
        assert_eq!(labels(&encounter.archived_events), ["a", "latecomer"]);
    }

    #[test]
    fn archive_appends_after_existing_entries() {
        let mut encounter = Encounter::new(GameTime(100.0));
        encounter.archived_events = vec![note(Some(1.0), "old")];
        encounter.history = vec![note(Some(2.0), "new")];

        archive_up_to(&mut encounter, None);
        assert_eq!(labels(&encounter.archived_events), ["old", "new"]);
    }

    #[test]
    fn unusable_cutoff_moves_nothing() {
        let mut encounter = Encounter::new(GameTime(10.0));
        encounter.history = vec![note(Some(3.0), "a")];

        let outcome = archive_up_to(&mut encounter, Some(GameTime(f64::NAN)));
        assert_eq!(outcome.moved, 0);
        assert!(!outcome.cutoff_applied);
        assert_eq!(encounter.history.len(), 1);
    }
}
