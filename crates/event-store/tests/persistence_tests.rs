//! Tests for load-on-open and save-on-mutate persistence.

use chrono::{TimeZone, Utc};
use event_store::config::DEFAULT_STORAGE_KEY;
use event_store::{
    snapshot, EventInput, EventStore, FileStorage, KeyValueStorage, MemoryStorage, Recurrence,
    StoreConfig,
};

fn sample_store() -> EventStore {
    let mut store = EventStore::new(MemoryStorage::new());
    store
        .add(
            EventInput::new("Standup", Utc.with_ymd_and_hms(2026, 3, 2, 9, 0, 0).unwrap())
                .with_recurrence(Recurrence::Weekly)
                .with_description("Daily sync")
                .with_color("#00aa00"),
        )
        .unwrap();
    store
        .add(EventInput::new(
            "Dentist",
            Utc.with_ymd_and_hms(2026, 3, 4, 15, 30, 0).unwrap(),
        ))
        .unwrap();
    store
}

#[test]
fn mutations_write_the_snapshot() {
    let store = sample_store();
    let saved = store.storage().get(DEFAULT_STORAGE_KEY).unwrap();
    let decoded = snapshot::decode(saved).unwrap();
    assert_eq!(decoded, store.events());
}

#[test]
fn snapshot_round_trip_is_field_for_field_equal() {
    let store = sample_store();
    let before = store.events().to_vec();

    let reopened = EventStore::new(store.into_storage());
    assert_eq!(reopened.events(), before.as_slice());
}

#[test]
fn snapshot_uses_camel_case_and_iso_dates() {
    let store = sample_store();
    let json: serde_json::Value = serde_json::from_str(&store.snapshot().unwrap()).unwrap();
    let first = &json[0];

    assert_eq!(first["date"], "2026-03-02T09:00:00Z");
    assert_eq!(first["isRecurringInstance"], false);
    assert_eq!(first["recurrence"], "weekly");
    assert!(first["familyId"].is_string());
}

#[test]
fn corrupted_snapshot_resets_to_empty_and_is_removed() {
    let storage = MemoryStorage::with_entry(DEFAULT_STORAGE_KEY, "[{\"id\": broken");
    let store = EventStore::new(storage);

    assert!(store.is_empty());
    assert_eq!(store.storage().get(DEFAULT_STORAGE_KEY), None);
}

#[test]
fn missing_snapshot_starts_empty() {
    let store = EventStore::new(MemoryStorage::new());
    assert!(store.is_empty());
}

#[test]
fn custom_storage_key_is_honoured() {
    let config = StoreConfig::default().with_storage_key("work-calendar");
    let mut store = EventStore::open(MemoryStorage::new(), config);
    store
        .add(EventInput::new(
            "Review",
            Utc.with_ymd_and_hms(2026, 3, 2, 9, 0, 0).unwrap(),
        ))
        .unwrap();

    let storage = store.into_storage();
    assert!(storage.get("work-calendar").is_some());
    assert!(storage.get(DEFAULT_STORAGE_KEY).is_none());
}

#[test]
fn browser_snapshot_loads_families() {
    let json = r##"[
        {"id":"1741000000000","title":"Gym","date":"2026-03-03T18:00:00.000Z","description":"",
         "recurrence":"weekly","color":"#3a87ad","isRecurringInstance":false},
        {"id":"1741000000000_1","title":"Gym","date":"2026-03-10T18:00:00.000Z","description":"",
         "recurrence":"weekly","color":"#3a87ad","isRecurringInstance":true}
    ]"##;
    let mut store = EventStore::new(MemoryStorage::with_entry(DEFAULT_STORAGE_KEY, json));

    assert_eq!(store.family("1741000000000").len(), 2);
    assert_eq!(store.delete_event("1741000000000_1"), 2);
}

#[test]
fn file_storage_survives_reopen() {
    let tmp = tempfile::tempdir().unwrap();

    let mut store = EventStore::new(FileStorage::new(tmp.path()));
    store
        .add(
            EventInput::new("Pay rent", Utc.with_ymd_and_hms(2026, 1, 31, 8, 0, 0).unwrap())
                .with_recurrence(Recurrence::Monthly),
        )
        .unwrap();
    let before = store.events().to_vec();
    drop(store);

    let reopened = EventStore::new(FileStorage::new(tmp.path()));
    assert_eq!(reopened.events(), before.as_slice());
}

#[test]
fn corrupted_file_is_discarded() {
    let tmp = tempfile::tempdir().unwrap();
    let mut storage = FileStorage::new(tmp.path());
    storage.save(DEFAULT_STORAGE_KEY, "not json").unwrap();

    let store = EventStore::new(storage);
    assert!(store.is_empty());
    assert_eq!(store.storage().load(DEFAULT_STORAGE_KEY).unwrap(), None);
}
