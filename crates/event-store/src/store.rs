//! The event store: canonical event list plus family-aware mutations.
//!
//! Every successful mutation writes the snapshot to the storage backend and
//! then notifies subscribers. Mutations compute their result before touching
//! state, so a rejected call leaves the list exactly as it was.

use chrono::NaiveDate;
use tracing::{debug, info, warn};

use crate::config::{ConflictPolicy, StoreConfig};
use crate::conflict;
use crate::error::{Result, StoreError};
use crate::event::{base_id_of, new_event_id, Event, EventInput, SEPARATOR};
use crate::expander::expand;
use crate::snapshot;
use crate::storage::{KeyValueStorage, MemoryStorage};
use crate::view;

/// Called with the full event list after every successful mutation.
pub type Listener = Box<dyn FnMut(&[Event]) + Send>;

/// Which records a delete removes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteScope {
    /// Only the record with the given id.
    Occurrence,
    /// Every record in the family of the given id, base included.
    Series,
}

pub struct EventStore<S = MemoryStorage> {
    events: Vec<Event>,
    storage: S,
    config: StoreConfig,
    listeners: Vec<Listener>,
}

impl<S: KeyValueStorage> EventStore<S> {
    /// Open a store with the default config.
    pub fn new(storage: S) -> Self {
        Self::open(storage, StoreConfig::default())
    }

    /// Open a store, loading the snapshot under `config.storage_key`.
    ///
    /// A snapshot that fails to parse is removed from storage and the store
    /// starts empty. Load never fails.
    pub fn open(mut storage: S, config: StoreConfig) -> Self {
        let key = config.storage_key.as_str();
        let events = match storage.load(key) {
            Ok(Some(json)) => match snapshot::decode(&json) {
                Ok(events) => {
                    info!(key, count = events.len(), "loaded calendar events");
                    events
                }
                Err(err) => {
                    warn!(key, %err, "discarding corrupted event snapshot");
                    if let Err(err) = storage.remove(key) {
                        warn!(key, %err, "failed to remove corrupted snapshot");
                    }
                    Vec::new()
                }
            },
            Ok(None) => Vec::new(),
            Err(err) => {
                warn!(key, %err, "failed to read event snapshot, starting empty");
                Vec::new()
            }
        };

        Self {
            events,
            storage,
            config,
            listeners: Vec::new(),
        }
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn into_storage(self) -> S {
        self.storage
    }

    /// All events in insertion order.
    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&Event> {
        self.events.iter().find(|e| e.id == id)
    }

    /// Every member of a family, base first when it is still present.
    pub fn family(&self, family_id: &str) -> Vec<&Event> {
        let mut members: Vec<&Event> = self
            .events
            .iter()
            .filter(|e| e.family_id == family_id)
            .collect();
        members.sort_by_key(|e| e.is_recurring_instance);
        members
    }

    /// Events falling on the given calendar day, in insertion order.
    pub fn events_for_date(&self, day: NaiveDate) -> Vec<&Event> {
        self.events
            .iter()
            .filter(|e| e.date.date_naive() == day)
            .collect()
    }

    /// Events falling anywhere in the given month.
    pub fn events_in_month(&self, year: i32, month: u32) -> Result<Vec<&Event>> {
        let (first, last) = view::month_bounds(year, month)?;
        Ok(self
            .events
            .iter()
            .filter(|e| (first..=last).contains(&e.date.date_naive()))
            .collect())
    }

    /// Serialized form of the current list, as written to storage.
    pub fn snapshot(&self) -> Result<String> {
        snapshot::encode(&self.events)
    }

    /// Register a listener for the post-mutation event list.
    pub fn subscribe(&mut self, listener: impl FnMut(&[Event]) + Send + 'static) {
        self.listeners.push(Box::new(listener));
    }

    /// Conflicts the candidate would have with the stored events.
    pub fn conflicts_with(&self, candidate: &Event) -> Vec<conflict::Conflict> {
        conflict::find_conflicts(&self.events, candidate)
    }

    /// Add a new event, expanding it into a family if it recurs.
    ///
    /// Returns the ids of every stored record created, base first.
    pub fn add(&mut self, input: EventInput) -> Result<Vec<String>> {
        let base = input.into_event(self.fresh_id());
        let family = expand(&base);
        self.ensure_no_conflict(&family, None)?;

        let ids: Vec<String> = family.iter().map(|e| e.id.clone()).collect();
        debug!(id = %base.id, recurrence = ?base.recurrence, count = ids.len(), "adding event");

        self.events.extend(family);
        self.commit();
        Ok(ids)
    }

    /// Apply an edited event.
    ///
    /// - Editing an instance regenerates the whole family from the edited
    ///   values, with the family's base id.
    /// - Editing a base whose recurrence changed regenerates its family.
    /// - Anything else replaces the single record in place; instances of an
    ///   edited base keep their old values.
    pub fn update(&mut self, updated: Event) -> Result<()> {
        if updated.is_recurring_instance {
            let family_id = if updated.family_id.is_empty() {
                base_id_of(&updated.id).to_string()
            } else {
                updated.family_id.clone()
            };
            let base = updated.into_base(family_id.clone());
            self.regenerate_family(&family_id, base)?;
        } else if self
            .get(&updated.id)
            .is_some_and(|stored| stored.recurrence != updated.recurrence)
        {
            let id = updated.id.clone();
            let base = updated.into_base(id.clone());
            self.regenerate_family(&id, base)?;
        } else {
            let index = self
                .events
                .iter()
                .position(|e| e.id == updated.id)
                .ok_or_else(|| StoreError::NotFound(updated.id.clone()))?;
            let stored = &self.events[index];
            let replacement = Event {
                family_id: stored.family_id.clone(),
                is_recurring_instance: stored.is_recurring_instance,
                ..updated
            };
            self.ensure_no_conflict(std::slice::from_ref(&replacement), None)?;

            debug!(id = %replacement.id, "replacing event in place");
            self.events[index] = replacement;
        }

        self.commit();
        Ok(())
    }

    /// Move an event to another day, keeping its time of day.
    ///
    /// Goes through [`update`](Self::update), so moving an instance moves its
    /// whole family to start on `day`.
    pub fn move_to_day(&mut self, id: &str, day: NaiveDate) -> Result<()> {
        let mut moved = self
            .get(id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        moved.date = day.and_time(moved.date.time()).and_utc();
        self.update(moved)
    }

    /// Delete with the scope inferred from the id, returning how many
    /// records were removed.
    ///
    /// A recurring instance id removes its whole family. Any other id removes
    /// that record alone, even a base whose instances are still stored. An
    /// unknown id containing the separator removes the family named by its
    /// prefix.
    ///
    /// Cascading follows the stored record's instance flag, not the shape of
    /// the id. A base re-rooted under an instance-shaped id such as `abc_3`
    /// (see [`update`](Self::update)) is therefore deleted alone, and the
    /// `abc` family it was cut from is left untouched.
    pub fn delete_event(&mut self, id: &str) -> usize {
        let family_id = match self.get(id) {
            Some(event) if event.is_recurring_instance => Some(event.family_id.clone()),
            Some(_) => None,
            None if id.contains(SEPARATOR) => Some(base_id_of(id).to_string()),
            None => return 0,
        };

        let removed = match family_id {
            Some(family_id) => self.remove_family(&family_id),
            None => self.remove_where(|e| e.id == id),
        };
        if removed > 0 {
            debug!(id, removed, "deleted events");
            self.commit();
        }
        removed
    }

    /// Delete with an explicit scope, returning how many records were removed.
    pub fn delete(&mut self, id: &str, scope: DeleteScope) -> Result<usize> {
        let family_id = self
            .get(id)
            .map(|e| e.family_id.clone())
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;

        let removed = match scope {
            DeleteScope::Occurrence => self.remove_where(|e| e.id == id),
            DeleteScope::Series => self.remove_family(&family_id),
        };
        debug!(id, ?scope, removed, "deleted events");
        self.commit();
        Ok(removed)
    }

    /// Replace the family `family_id` with the expansion of `base`.
    fn regenerate_family(&mut self, family_id: &str, base: Event) -> Result<()> {
        let family = expand(&base);
        self.ensure_no_conflict(&family, Some(family_id))?;

        let removed = self.remove_family(family_id);
        debug!(
            family_id,
            removed,
            added = family.len(),
            recurrence = ?base.recurrence,
            "regenerating event family"
        );
        self.events.extend(family);
        Ok(())
    }

    fn remove_family(&mut self, family_id: &str) -> usize {
        self.remove_where(|e| e.family_id == family_id || e.id == family_id)
    }

    fn remove_where(&mut self, mut pred: impl FnMut(&Event) -> bool) -> usize {
        let before = self.events.len();
        self.events.retain(|e| !pred(e));
        before - self.events.len()
    }

    /// Under `ConflictPolicy::Reject`, fail if any of `candidates` overlaps a
    /// stored event outside `replacing` (the family about to be rewritten).
    fn ensure_no_conflict(&self, candidates: &[Event], replacing: Option<&str>) -> Result<()> {
        if self.config.conflict_policy == ConflictPolicy::Ignore {
            return Ok(());
        }

        let others: Vec<Event> = self
            .events
            .iter()
            .filter(|e| replacing.is_none_or(|family_id| e.family_id != family_id))
            .cloned()
            .collect();

        for candidate in candidates {
            if let Some(found) = conflict::find_conflicts(&others, candidate).into_iter().next() {
                debug!(
                    candidate = %candidate.id,
                    existing = %found.existing_id,
                    "rejecting conflicting event"
                );
                return Err(StoreError::Conflict {
                    candidate: candidate.date.to_rfc3339(),
                    existing: found.existing_id,
                    overlap_minutes: found.overlap_minutes,
                });
            }
        }
        Ok(())
    }

    fn fresh_id(&self) -> String {
        loop {
            let id = new_event_id();
            if !self.events.iter().any(|e| e.id == id || e.family_id == id) {
                return id;
            }
        }
    }

    /// Persist the snapshot, then notify listeners.
    fn commit(&mut self) {
        let key = self.config.storage_key.as_str();
        match snapshot::encode(&self.events) {
            Ok(json) => {
                if let Err(err) = self.storage.save(key, &json) {
                    warn!(key, %err, "failed to save event snapshot");
                }
            }
            Err(err) => warn!(key, %err, "failed to encode event snapshot"),
        }

        for listener in self.listeners.iter_mut() {
            listener(&self.events);
        }
    }
}

impl<S> std::fmt::Debug for EventStore<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventStore")
            .field("events", &self.events.len())
            .field("config", &self.config)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}
