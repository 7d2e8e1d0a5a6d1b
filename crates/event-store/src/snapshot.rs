//! Persisted layout: the whole event list as one JSON array.
//!
//! Field names are camelCase and `date` is an RFC 3339 string, so snapshots
//! written by the browser front end (`"2026-03-01T09:00:00.000Z"`) load as-is.

use crate::error::Result;
use crate::event::{base_id_of, Event};

/// Serialize the event list into its persisted form.
pub fn encode(events: &[Event]) -> Result<String> {
    Ok(serde_json::to_string(events)?)
}

/// Parse a persisted event list.
///
/// Records without a `familyId` get one recovered from their id, so
/// snapshots written before the field existed keep their families intact.
/// Records missing optional fields (`title`, `description`, `recurrence`,
/// `color`, `isRecurringInstance`) load with defaults. The snapshot is
/// otherwise validated as a whole: a record without a parseable `id` or
/// `date` rejects the entire list.
pub fn decode(json: &str) -> Result<Vec<Event>> {
    let mut events: Vec<Event> = serde_json::from_str(json)?;
    for event in events.iter_mut().filter(|e| e.family_id.is_empty()) {
        event.family_id = base_id_of(&event.id).to_string();
    }
    Ok(events)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::Recurrence;
    use chrono::{TimeZone, Utc};

    #[test]
    fn decodes_browser_snapshot_without_family_ids() {
        let json = r##"[
            {"id":"1700000000000","title":"Gym","date":"2026-03-01T09:00:00.000Z",
             "description":"","recurrence":"daily","color":"#3a87ad","isRecurringInstance":false,"time":"09:00"},
            {"id":"1700000000000_1","title":"Gym","date":"2026-03-02T09:00:00.000Z",
             "description":"","recurrence":"daily","color":"#3a87ad","isRecurringInstance":true}
        ]"##;

        let events = decode(json).unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].family_id, "1700000000000");
        assert_eq!(events[1].family_id, "1700000000000");
        assert_eq!(events[1].recurrence, Recurrence::Daily);
        assert_eq!(
            events[1].date,
            Utc.with_ymd_and_hms(2026, 3, 2, 9, 0, 0).unwrap()
        );
        assert_eq!(events[0].description.as_deref(), Some(""));
    }

    #[test]
    fn explicit_family_id_is_kept() {
        let json = r#"[{"id":"a_b","familyId":"a_b","title":"x","date":"2026-03-01T09:00:00Z"}]"#;
        let events = decode(json).unwrap();
        assert_eq!(events[0].family_id, "a_b");
    }

    #[test]
    fn record_without_title_keeps_the_rest_of_the_snapshot() {
        let json = r#"[
            {"id":"a","date":"2026-03-01T09:00:00Z"},
            {"id":"b","title":"Kept","date":"2026-03-02T09:00:00Z"}
        ]"#;
        let events = decode(json).unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].title, "");
        assert_eq!(events[1].title, "Kept");
    }

    #[test]
    fn record_without_date_rejects_the_snapshot() {
        let json = r#"[{"id":"a","title":"x"},{"id":"b","title":"y","date":"2026-03-02T09:00:00Z"}]"#;
        assert!(decode(json).is_err());
    }

    #[test]
    fn rejects_non_array() {
        assert!(decode("{\"not\":\"a list\"}").is_err());
        assert!(decode("not json").is_err());
    }
}
