//! Property-based tests for the session-state invariants.
//!
//! Random inputs exercise the three core guarantees:
//! - archiving partitions the event multiset without loss or duplication,
//! - turn advancement is a cyclic walk over the initiative order,
//! - a mind never holds the same thought twice, whatever op sequence runs.

use proptest::prelude::*;

use gm_core::character::{Character, MindLocation};
use gm_core::encounter::{Encounter, HistoryEvent, Initiative};
use gm_core::initiative::{apply_advance, plan_advance};
use gm_core::types::{CharacterId, EncounterId, GameTime, ThoughtId};
use gm_core::{archive, mind};

// ---------------------------------------------------------------------------
// Strategy helpers
// ---------------------------------------------------------------------------

fn arb_time() -> impl Strategy<Value = Option<f64>> {
    prop_oneof![
        4 => (-500.0..500.0f64).prop_map(Some),
        1 => Just(None),
        1 => Just(Some(f64::NAN)),
    ]
}

fn arb_events() -> impl Strategy<Value = Vec<HistoryEvent>> {
    prop::collection::vec((arb_time(), 0u32..8), 0..40).prop_map(|specs| {
        specs
            .into_iter()
            .map(|(time, label)| HistoryEvent {
                time: time.map(serde_json::Value::from),
                kind: "NOTE".to_string(),
                description: format!("event-{label}"),
                previous_character_id: None,
                next_character_id: None,
                extra: serde_json::Map::new(),
            })
            .collect()
    })
}

fn label_counts(events: &[HistoryEvent]) -> std::collections::HashMap<String, usize> {
    let mut counts = std::collections::HashMap::new();
    for event in events {
        *counts.entry(event.description.clone()).or_insert(0) += 1;
    }
    counts
}

fn is_subsequence(sub: &[String], full: &[String]) -> bool {
    let mut iter = full.iter();
    sub.iter().all(|item| iter.any(|candidate| candidate == item))
}

// ---------------------------------------------------------------------------
// Property: archiving is a lossless partition by the cutoff
// ---------------------------------------------------------------------------

proptest! {
    #[test]
    fn archive_partitions_without_loss_or_duplication(
        events in arb_events(),
        cutoff in -500.0..500.0f64,
    ) {
        let mut encounter = Encounter::new(GameTime(0.0));
        encounter.history = events.clone();
        let before = label_counts(&events);

        archive::archive_up_to(&mut encounter, Some(GameTime(cutoff)));

        // Every archived event is at or before the cutoff.
        for event in &encounter.archived_events {
            let time = event.usable_time().expect("archived events have usable times");
            prop_assert!(time <= GameTime(cutoff));
        }
        // Every remaining active event is after the cutoff or undatable.
        for event in &encounter.history {
            match event.usable_time() {
                Some(time) => prop_assert!(time > GameTime(cutoff)),
                None => {}
            }
        }

        // The union is exactly the original multiset.
        let mut after = label_counts(&encounter.history);
        for (label, count) in label_counts(&encounter.archived_events) {
            *after.entry(label).or_insert(0) += count;
        }
        prop_assert_eq!(before, after);
    }

    #[test]
    fn archive_preserves_relative_order(
        events in arb_events(),
        cutoff in -500.0..500.0f64,
    ) {
        let original: Vec<String> = events.iter().map(|e| e.description.clone()).collect();
        let mut encounter = Encounter::new(GameTime(0.0));
        encounter.history = events;

        archive::archive_up_to(&mut encounter, Some(GameTime(cutoff)));

        let archived: Vec<String> = encounter
            .archived_events
            .iter()
            .map(|e| e.description.clone())
            .collect();
        let active: Vec<String> = encounter
            .history
            .iter()
            .map(|e| e.description.clone())
            .collect();
        prop_assert!(is_subsequence(&archived, &original));
        prop_assert!(is_subsequence(&active, &original));
    }

    #[test]
    fn archive_twice_with_same_cutoff_is_stable(
        events in arb_events(),
        cutoff in -500.0..500.0f64,
    ) {
        let mut encounter = Encounter::new(GameTime(0.0));
        encounter.history = events;

        archive::archive_up_to(&mut encounter, Some(GameTime(cutoff)));
        let archived_len = encounter.archived_events.len();
        let active_len = encounter.history.len();

        let second = archive::archive_up_to(&mut encounter, Some(GameTime(cutoff)));
        prop_assert_eq!(second.moved, 0);
        prop_assert_eq!(encounter.archived_events.len(), archived_len);
        prop_assert_eq!(encounter.history.len(), active_len);
    }
}

// ---------------------------------------------------------------------------
// Property: turn advancement is a cyclic walk
// ---------------------------------------------------------------------------

proptest! {
    #[test]
    fn k_advances_land_on_k_mod_n(
        len in 1usize..12,
        advances in 0usize..40,
    ) {
        let encounter_id = EncounterId::from("prop");
        let mut encounter = Encounter::new(GameTime(1.0));
        encounter.initiative = Some(Initiative::from_order(
            (0..len).map(|i| CharacterId::from(format!("c{i}"))),
        ));

        for _ in 0..advances {
            let change = plan_advance(&encounter, &encounter_id).expect("plan");
            apply_advance(&mut encounter, change, "x", "y");
        }

        let initiative = encounter.initiative.as_ref().expect("initiative");
        prop_assert_eq!(initiative.current_index, advances % len);
        prop_assert_eq!(encounter.history.len(), advances);

        // The order itself never changes, only the pointer.
        prop_assert_eq!(initiative.order.len(), len);
    }

    #[test]
    fn full_cycle_always_returns_to_start(len in 1usize..12, start in 0usize..12) {
        let encounter_id = EncounterId::from("prop");
        let mut encounter = Encounter::new(GameTime(1.0));
        let mut initiative = Initiative::from_order(
            (0..len).map(|i| CharacterId::from(format!("c{i}"))),
        );
        let start = start % len;
        initiative.current_index = start;
        encounter.initiative = Some(initiative);

        for _ in 0..len {
            let change = plan_advance(&encounter, &encounter_id).expect("plan");
            apply_advance(&mut encounter, change, "x", "y");
        }

        prop_assert_eq!(
            encounter.initiative.expect("initiative").current_index,
            start
        );
    }
}

// ---------------------------------------------------------------------------
// Property: mind uniqueness under arbitrary op sequences
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
enum MindOp {
    Attach(u8),
    Detach(u8),
    Move(u8, MindLocation),
}

fn arb_mind_ops() -> impl Strategy<Value = Vec<MindOp>> {
    let op = prop_oneof![
        (0u8..5).prop_map(MindOp::Attach),
        (0u8..5).prop_map(MindOp::Detach),
        (0u8..5, prop::bool::ANY).prop_map(|(t, active)| MindOp::Move(
            t,
            if active { MindLocation::Active } else { MindLocation::Memory },
        )),
    ];
    prop::collection::vec(op, 0..40)
}

proptest! {
    #[test]
    fn mind_never_holds_duplicates_and_errors_change_nothing(ops in arb_mind_ops()) {
        let character_id = CharacterId::from("prop");
        let mut character = Character::default();

        for op in ops {
            let before = character.mind.clone();
            let result = match &op {
                MindOp::Attach(t) => {
                    mind::attach(&mut character, &character_id, ThoughtId::from(format!("t{t}")))
                }
                MindOp::Detach(t) => {
                    mind::detach(&mut character, &character_id, &ThoughtId::from(format!("t{t}")))
                }
                MindOp::Move(t, to) => mind::relocate(
                    &mut character,
                    &character_id,
                    &ThoughtId::from(format!("t{t}")),
                    *to,
                ),
            };

            if result.is_err() {
                prop_assert_eq!(&before, &character.mind, "failed op must not mutate");
            }

            // Uniqueness invariant holds after every step.
            let mut seen = std::collections::HashSet::new();
            for entry in &character.mind {
                prop_assert!(seen.insert(entry.thought_id.clone()));
            }
        }
    }

    #[test]
    fn attach_always_starts_in_memory_with_zero_scores(t in 0u8..50) {
        let character_id = CharacterId::from("prop");
        let mut character = Character::default();
        mind::attach(&mut character, &character_id, ThoughtId::from(format!("t{t}")))
            .expect("attach into empty mind");

        let entry = &character.mind[0];
        prop_assert_eq!(entry.affinity, 0.0);
        prop_assert_eq!(entry.knowledge, 0.0);
        prop_assert_eq!(entry.location, MindLocation::Memory);
    }
}
