//! WASM bindings for event-store.
//!
//! Exposes the event store to the calendar's JavaScript UI via
//! `wasm-bindgen`. All complex values cross the boundary as JSON strings.
//! Mutating calls return `true` on success. After every successful mutation
//! the callback registered with `onEventsChanged(cb)` is invoked as
//! `cb(eventsJson, snapshot)`; the UI redraws from the first argument and
//! writes the second to `localStorage` under `storageKey()`.
//!
//! ## Build process
//!
//! ```sh
//! cargo build -p event-store-wasm --target wasm32-unknown-unknown --release
//! wasm-bindgen --target web --out-dir web/pkg/ \
//!   target/wasm32-unknown-unknown/release/event_store_wasm.wasm
//! ```

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use event_store::event::{Event, EventInput, Recurrence};
use event_store::{DeleteScope, EventStore, MemoryStorage, StoreConfig};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use wasm_bindgen::prelude::*;

// ---------------------------------------------------------------------------
// Serde-friendly DTOs for crossing the WASM boundary as JSON
// ---------------------------------------------------------------------------

/// An event as submitted by the event form or a drag-and-drop handler.
///
/// `date` is either a full ISO 8601 timestamp or a `YYYY-MM-DD` day, in
/// which case `time` (`HH:MM`) is required. `id` is present when editing.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct FormEvent {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    family_id: Option<String>,
    #[serde(default)]
    title: String,
    #[serde(default)]
    date: String,
    #[serde(default)]
    time: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    recurrence: Recurrence,
    #[serde(default)]
    color: Option<String>,
    #[serde(default)]
    is_recurring_instance: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct EventDto<'a> {
    #[serde(flatten)]
    event: &'a Event,
    display_date: String,
}

impl<'a> From<&'a Event> for EventDto<'a> {
    fn from(event: &'a Event) -> Self {
        Self {
            event,
            display_date: event_store::format_event_date(event),
        }
    }
}

// ---------------------------------------------------------------------------
// Helpers: input-boundary validation and parsing
// ---------------------------------------------------------------------------

/// Parse the form's date (and optional time) into a UTC timestamp.
///
/// Accepts RFC 3339 (e.g., "2026-03-01T09:00:00.000Z"), naive datetimes
/// (e.g., "2026-03-01T09:00" or "2026-03-01T09:00:00", read as UTC), and a
/// bare day plus a separate `HH:MM` time.
fn parse_form_datetime(date: &str, time: Option<&str>) -> Result<DateTime<Utc>, String> {
    let date = date.trim();
    if date.is_empty() {
        return Err("Date is required".to_string());
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(date) {
        return Ok(dt.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M"] {
        if let Ok(ndt) = NaiveDateTime::parse_from_str(date, format) {
            return Ok(ndt.and_utc());
        }
    }

    let day = parse_day(date)?;
    let time = time
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| "Time is required".to_string())?;
    let time = NaiveTime::parse_from_str(time, "%H:%M")
        .map_err(|e| format!("Invalid time '{}': {}", time, e))?;
    Ok(day.and_time(time).and_utc())
}

fn parse_day(day: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(day.trim(), "%Y-%m-%d")
        .map_err(|e| format!("Invalid date '{}': {}", day, e))
}

impl FormEvent {
    fn parse(json: &str) -> Result<Self, String> {
        let form: FormEvent =
            serde_json::from_str(json).map_err(|e| format!("Invalid event JSON: {}", e))?;
        if form.title.trim().is_empty() {
            return Err("Title is required".to_string());
        }
        Ok(form)
    }

    fn datetime(&self) -> Result<DateTime<Utc>, String> {
        parse_form_datetime(&self.date, self.time.as_deref())
    }

    fn into_input(self) -> Result<EventInput, String> {
        let mut input = EventInput::new(self.title.clone(), self.datetime()?)
            .with_recurrence(self.recurrence);
        input.description = self.description;
        if let Some(color) = self.color {
            input = input.with_color(color);
        }
        Ok(input)
    }

    /// The edited event, with fields the form did not send taken from `stored`.
    fn into_event(self, stored: Option<&Event>) -> Result<Event, String> {
        let date = self.datetime()?;
        let id = self.id.ok_or_else(|| "Event id is required".to_string())?;
        let family_id = self
            .family_id
            .or_else(|| stored.map(|e| e.family_id.clone()))
            .unwrap_or_default();
        let color = self
            .color
            .or_else(|| stored.map(|e| e.color.clone()))
            .unwrap_or_else(|| event_store::event::DEFAULT_COLOR.to_string());

        Ok(Event {
            id,
            family_id,
            title: self.title,
            date,
            description: self.description,
            recurrence: self.recurrence,
            color,
            is_recurring_instance: self.is_recurring_instance,
        })
    }
}

fn events_json<'a>(events: impl IntoIterator<Item = &'a Event>) -> Result<String, JsValue> {
    let dtos: Vec<EventDto> = events.into_iter().map(EventDto::from).collect();
    serde_json::to_string(&dtos)
        .map_err(|e| JsValue::from_str(&format!("Serialization error: {}", e)))
}

// ---------------------------------------------------------------------------
// WASM exports
// ---------------------------------------------------------------------------

/// The calendar's event store, owned by the JavaScript UI.
#[wasm_bindgen]
pub struct CalendarStore {
    inner: EventStore<MemoryStorage>,
    /// Set by the store's listener, drained by [`CalendarStore::notify`].
    changed: Arc<AtomicBool>,
    on_change: Option<js_sys::Function>,
    revision: u32,
}

#[wasm_bindgen]
impl CalendarStore {
    /// Open a store from the value previously saved in `localStorage`.
    ///
    /// `stored` may be missing or corrupted; a corrupted value yields an empty
    /// store. `config_json` is an optional `StoreConfig` object
    /// (`{"storageKey": ..., "conflictPolicy": "ignore" | "reject"}`); an
    /// unparseable config falls back to the defaults.
    #[wasm_bindgen(constructor)]
    pub fn new(stored: Option<String>, config_json: Option<String>) -> CalendarStore {
        let config = match config_json.as_deref().map(StoreConfig::from_json) {
            Some(Ok(config)) => config,
            Some(Err(err)) => {
                warn!(%err, "invalid store config, using defaults");
                StoreConfig::default()
            }
            None => StoreConfig::default(),
        };
        let storage = match stored {
            Some(json) => MemoryStorage::with_entry(config.storage_key.clone(), json),
            None => MemoryStorage::new(),
        };

        let mut inner = EventStore::open(storage, config);
        let changed = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&changed);
        inner.subscribe(move |_| flag.store(true, Ordering::Release));

        CalendarStore {
            inner,
            changed,
            on_change: None,
            revision: 0,
        }
    }

    /// Register `cb(eventsJson, snapshot)`, called after every successful
    /// mutation. Replaces any previously registered callback.
    #[wasm_bindgen(js_name = "onEventsChanged")]
    pub fn on_events_changed(&mut self, cb: js_sys::Function) {
        self.on_change = Some(cb);
    }

    /// Number of successful mutations since the store was opened.
    #[wasm_bindgen(getter)]
    pub fn revision(&self) -> u32 {
        self.revision
    }

    /// The `localStorage` key the snapshot belongs under.
    #[wasm_bindgen(js_name = "storageKey")]
    pub fn storage_key(&self) -> String {
        self.inner.config().storage_key.clone()
    }

    /// Add an event from the form. Returns `false` for invalid input or,
    /// under the `reject` conflict policy, an overlapping time.
    #[wasm_bindgen(js_name = "addEvent")]
    pub fn add_event(&mut self, input_json: &str) -> bool {
        let input = match FormEvent::parse(input_json).and_then(FormEvent::into_input) {
            Ok(input) => input,
            Err(err) => {
                debug!(%err, "rejected event input");
                return false;
            }
        };
        match self.inner.add(input) {
            Ok(_) => {
                self.notify();
                true
            }
            Err(err) => {
                debug!(%err, "add failed");
                false
            }
        }
    }

    /// Apply an edited event. Editing a recurring instance rewrites its
    /// whole series.
    #[wasm_bindgen(js_name = "updateEvent")]
    pub fn update_event(&mut self, input_json: &str) -> bool {
        let event = FormEvent::parse(input_json).and_then(|form| {
            let stored = form.id.as_deref().and_then(|id| self.inner.get(id));
            form.into_event(stored)
        });
        let event = match event {
            Ok(event) => event,
            Err(err) => {
                debug!(%err, "rejected event input");
                return false;
            }
        };
        match self.inner.update(event) {
            Ok(()) => {
                self.notify();
                true
            }
            Err(err) => {
                debug!(%err, "update failed");
                false
            }
        }
    }

    /// Delete with the scope inferred from the id: an instance id removes the
    /// series, any other id removes that one record.
    #[wasm_bindgen(js_name = "deleteEvent")]
    pub fn delete_event(&mut self, id: &str) {
        self.inner.delete_event(id);
        self.notify();
    }

    /// Delete every event in the series of `id`.
    #[wasm_bindgen(js_name = "deleteSeries")]
    pub fn delete_series(&mut self, id: &str) -> bool {
        let deleted = self.inner.delete(id, DeleteScope::Series).is_ok();
        self.notify();
        deleted
    }

    /// Delete only the event with `id`.
    #[wasm_bindgen(js_name = "deleteOccurrence")]
    pub fn delete_occurrence(&mut self, id: &str) -> bool {
        let deleted = self.inner.delete(id, DeleteScope::Occurrence).is_ok();
        self.notify();
        deleted
    }

    /// Drag-and-drop reschedule to `day` (`YYYY-MM-DD`), keeping the time.
    #[wasm_bindgen(js_name = "moveEvent")]
    pub fn move_event(&mut self, id: &str, day: &str) -> bool {
        let moved = parse_day(day).and_then(|day| {
            self.inner
                .move_to_day(id, day)
                .map_err(|err| err.to_string())
        });
        match moved {
            Ok(()) => {
                self.notify();
                true
            }
            Err(err) => {
                debug!(id, %err, "move failed");
                false
            }
        }
    }

    /// Whether the form's event would overlap a stored event.
    #[wasm_bindgen(js_name = "checkConflict")]
    pub fn check_conflict(&self, input_json: &str) -> Result<bool, JsValue> {
        let form = FormEvent::parse(input_json).map_err(|e| JsValue::from_str(&e))?;
        let id = form.id.clone().unwrap_or_default();
        let candidate = form
            .into_input()
            .map_err(|e| JsValue::from_str(&e))?
            .into_event(id);
        Ok(event_store::check_conflict(self.inner.events(), &candidate))
    }

    /// Events on `day` (`YYYY-MM-DD`) as a JSON array.
    #[wasm_bindgen(js_name = "getEventsForDate")]
    pub fn events_for_date(&self, day: &str) -> Result<String, JsValue> {
        let day = parse_day(day).map_err(|e| JsValue::from_str(&e))?;
        events_json(self.inner.events_for_date(day))
    }

    /// Every event as a JSON array, in insertion order.
    #[wasm_bindgen(js_name = "eventsJson")]
    pub fn events(&self) -> Result<String, JsValue> {
        events_json(self.inner.events())
    }

    /// The value to write to `localStorage` under `storageKey()`.
    pub fn snapshot(&self) -> Result<String, JsValue> {
        self.inner
            .snapshot()
            .map_err(|e| JsValue::from_str(&e.to_string()))
    }
}

impl CalendarStore {
    /// Dispatch a pending change to the registered callback. A no-op when
    /// the last call did not mutate the store.
    fn notify(&mut self) {
        if !self.changed.swap(false, Ordering::AcqRel) {
            return;
        }
        self.revision = self.revision.wrapping_add(1);

        let Some(cb) = &self.on_change else {
            return;
        };
        let payload = events_json(self.inner.events()).and_then(|events| {
            let snapshot = self.snapshot()?;
            Ok((events, snapshot))
        });
        let result = payload.and_then(|(events, snapshot)| {
            cb.call2(
                &JsValue::NULL,
                &JsValue::from_str(&events),
                &JsValue::from_str(&snapshot),
            )
        });
        if let Err(err) = result {
            warn!(?err, "events-changed callback failed");
        }
    }
}

/// Sunday-first weeks covering a month, as a JSON array of arrays of
/// `YYYY-MM-DD` strings.
#[wasm_bindgen(js_name = "monthGrid")]
pub fn month_grid(year: i32, month: u32) -> Result<String, JsValue> {
    let weeks = event_store::month_grid(year, month).map_err(|e| JsValue::from_str(&e.to_string()))?;
    let weeks: Vec<Vec<String>> = weeks
        .iter()
        .map(|week| week.iter().map(|d| d.format("%Y-%m-%d").to_string()).collect())
        .collect();
    serde_json::to_string(&weeks)
        .map_err(|e| JsValue::from_str(&format!("Serialization error: {}", e)))
}
