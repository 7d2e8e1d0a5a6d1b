//! # event-store
//!
//! Recurring event store for a month-view calendar.
//!
//! Holds the canonical list of calendar events, expands recurring events into
//! concrete instances, and applies create/update/delete while keeping each
//! recurrence family (a base event plus its generated instances) consistent.
//! Rendering and input handling live in the UI; this crate is what the UI
//! calls into.
//!
//! ## Modules
//!
//! - [`event`] — `Event`, `EventInput`, `Recurrence`, id helpers
//! - [`expander`] — base event → fixed-size family of instances
//! - [`store`] — `EventStore`: family-aware CRUD with load/save hooks
//! - [`conflict`] — one-hour slot overlap checks
//! - [`snapshot`] — persisted JSON layout
//! - [`storage`] — key-value backends (`MemoryStorage`, `FileStorage`)
//! - [`config`] — `StoreConfig`, `ConflictPolicy`
//! - [`view`] — month bounds and grid
//! - [`error`] — Error types
//!
//! ## Quick start
//!
//! ```rust
//! use chrono::{TimeZone, Utc};
//! use event_store::{EventInput, EventStore, MemoryStorage, Recurrence};
//!
//! let mut store = EventStore::new(MemoryStorage::new());
//! let date = Utc.with_ymd_and_hms(2026, 3, 2, 9, 0, 0).unwrap();
//! let ids = store
//!     .add(EventInput::new("Standup", date).with_recurrence(Recurrence::Weekly))
//!     .unwrap();
//!
//! assert_eq!(ids.len(), 13);
//! assert_eq!(store.len(), 13);
//! ```

pub mod config;
pub mod conflict;
pub mod error;
pub mod event;
pub mod expander;
pub mod snapshot;
pub mod storage;
pub mod store;
pub mod view;

pub use config::{ConflictPolicy, StoreConfig};
pub use conflict::{check_conflict, find_conflicts, Conflict};
pub use error::StoreError;
pub use event::{format_event_date, Event, EventInput, Recurrence};
pub use expander::expand;
pub use storage::{FileStorage, KeyValueStorage, MemoryStorage};
pub use store::{DeleteScope, EventStore};
pub use view::month_grid;
