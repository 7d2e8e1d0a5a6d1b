//! Tests for recurrence expansion.

use chrono::{DateTime, Datelike, Duration, TimeZone, Timelike, Utc};
use event_store::event::Event;
use event_store::{expand, Recurrence};

fn at(year: i32, month: u32, day: u32, hour: u32, min: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, hour, min, 0).unwrap()
}

fn base(recurrence: Recurrence, date: DateTime<Utc>) -> Event {
    Event {
        id: "base".to_string(),
        family_id: "base".to_string(),
        title: "Yoga".to_string(),
        date,
        description: Some("Bring a mat".to_string()),
        recurrence,
        color: "#ff0000".to_string(),
        is_recurring_instance: false,
    }
}

// ---------------------------------------------------------------------------
// Counts and dates per recurrence kind
// ---------------------------------------------------------------------------

#[test]
fn non_recurring_expands_to_itself() {
    let event = base(Recurrence::None, at(2026, 3, 1, 9, 0));
    assert_eq!(expand(&event), vec![event]);
}

#[test]
fn daily_produces_base_plus_thirty_days() {
    let event = base(Recurrence::Daily, at(2026, 3, 1, 9, 0));
    let family = expand(&event);

    assert_eq!(family.len(), 31, "1 base + 30 daily instances");
    assert_eq!(family[0], event);
    for (i, instance) in family.iter().enumerate().skip(1) {
        assert_eq!(
            instance.date - event.date,
            Duration::days(i as i64),
            "instance {} should be {} days after base",
            i,
            i
        );
    }
    assert_eq!(family[30].date, at(2026, 3, 31, 9, 0));
}

#[test]
fn weekly_produces_base_plus_twelve_weeks() {
    let event = base(Recurrence::Weekly, at(2026, 2, 17, 14, 0));
    let family = expand(&event);

    assert_eq!(family.len(), 13, "1 base + 12 weekly instances");
    for (i, instance) in family.iter().enumerate() {
        assert_eq!(instance.date - event.date, Duration::days(7 * i as i64));
        assert_eq!(instance.date.weekday(), event.date.weekday());
    }
}

#[test]
fn monthly_advances_calendar_months() {
    let event = base(Recurrence::Monthly, at(2026, 1, 15, 8, 30));
    let family = expand(&event);

    assert_eq!(family.len(), 13, "1 base + 12 monthly instances");
    for (i, instance) in family.iter().enumerate() {
        let months = event.date.month0() + i as u32;
        assert_eq!(instance.date.year(), 2026 + (months / 12) as i32);
        assert_eq!(instance.date.month0(), months % 12);
        assert_eq!(instance.date.day(), 15);
        assert_eq!((instance.date.hour(), instance.date.minute()), (8, 30));
    }
    assert_eq!(family[12].date, at(2027, 1, 15, 8, 30));
}

#[test]
fn monthly_clamps_to_month_end_without_drift() {
    let event = base(Recurrence::Monthly, at(2026, 1, 31, 10, 0));
    let family = expand(&event);

    // Feb has 28 days in 2026; the clamp does not leak into later months.
    assert_eq!(family[1].date, at(2026, 2, 28, 10, 0));
    assert_eq!(family[2].date, at(2026, 3, 31, 10, 0));
    assert_eq!(family[3].date, at(2026, 4, 30, 10, 0));
    assert_eq!(family[4].date, at(2026, 5, 31, 10, 0));
}

// ---------------------------------------------------------------------------
// Instance identity and copied fields
// ---------------------------------------------------------------------------

#[test]
fn instances_are_numbered_and_flagged() {
    let event = base(Recurrence::Weekly, at(2026, 3, 1, 9, 0));
    let family = expand(&event);

    assert!(!family[0].is_recurring_instance);
    assert_eq!(family[0].id, "base");
    for (i, instance) in family.iter().enumerate().skip(1) {
        assert_eq!(instance.id, format!("base_{}", i));
        assert_eq!(instance.family_id, "base");
        assert!(instance.is_recurring_instance);
    }
}

#[test]
fn instances_copy_base_fields() {
    let event = base(Recurrence::Daily, at(2026, 3, 1, 9, 0));
    for instance in expand(&event) {
        assert_eq!(instance.title, event.title);
        assert_eq!(instance.description, event.description);
        assert_eq!(instance.color, event.color);
        assert_eq!(instance.recurrence, Recurrence::Daily);
    }
}

#[test]
fn expansion_is_deterministic() {
    let event = base(Recurrence::Monthly, at(2026, 5, 31, 23, 59));
    assert_eq!(expand(&event), expand(&event));
}

#[test]
fn expansion_stops_at_end_of_representable_time() {
    let event = base(Recurrence::Daily, DateTime::<Utc>::MAX_UTC - Duration::days(3));
    let family = expand(&event);
    assert_eq!(family.len(), 4, "base plus the three days that still fit");
}
