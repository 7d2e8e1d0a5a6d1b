//! Detect overlapping events.
//!
//! Every event occupies a fixed one-hour slot starting at its date. Adjacent
//! slots (where one ends exactly when another starts) are NOT conflicts.

use chrono::{DateTime, Duration, Utc};

use crate::event::Event;

/// Length of the slot every event is assumed to occupy.
pub const SLOT_MINUTES: i64 = 60;

/// A stored event that overlaps a candidate.
#[derive(Debug, Clone, PartialEq)]
pub struct Conflict {
    pub existing_id: String,
    pub overlap_minutes: i64,
}

/// The `[start, end)` slot occupied by an event.
///
/// A slot that would run past the last representable instant ends there.
pub fn slot(event: &Event) -> (DateTime<Utc>, DateTime<Utc>) {
    let end = event
        .date
        .checked_add_signed(Duration::minutes(SLOT_MINUTES))
        .unwrap_or(DateTime::<Utc>::MAX_UTC);
    (event.date, end)
}

/// Find every event in `events` whose slot overlaps the candidate's slot.
///
/// Two slots overlap when `a.start < b.end && b.start < a.end`. An event with
/// the candidate's own id is skipped, so an edited event never conflicts
/// with its stored copy.
pub fn find_conflicts(events: &[Event], candidate: &Event) -> Vec<Conflict> {
    let (c_start, c_end) = slot(candidate);

    events
        .iter()
        .filter(|e| e.id != candidate.id)
        .filter_map(|e| {
            let (start, end) = slot(e);
            if c_start < end && start < c_end {
                let overlap_minutes = (c_end.min(end) - c_start.max(start)).num_minutes();
                Some(Conflict {
                    existing_id: e.id.clone(),
                    overlap_minutes,
                })
            } else {
                None
            }
        })
        .collect()
}

/// True if the candidate overlaps any event in `events`.
pub fn check_conflict(events: &[Event], candidate: &Event) -> bool {
    let (c_start, c_end) = slot(candidate);
    events.iter().filter(|e| e.id != candidate.id).any(|e| {
        let (start, end) = slot(e);
        c_start < end && start < c_end
    })
}
