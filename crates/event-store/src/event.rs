//! Calendar event data model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Joins a base id and a sequence index into an instance id (`"<base>_<i>"`).
pub const SEPARATOR: char = '_';

/// Display color used when the caller does not pick one.
pub const DEFAULT_COLOR: &str = "#3a87ad";

/// How often an event repeats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Recurrence {
    #[default]
    None,
    Daily,
    Weekly,
    Monthly,
}

/// A stored calendar event: either a plain event, the base of a recurrence
/// family, or one of the instances generated from that base.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub id: String,
    /// Id of the family's base event. Equal to `id` for plain and base events.
    #[serde(default)]
    pub family_id: String,
    #[serde(default)]
    pub title: String,
    pub date: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub recurrence: Recurrence,
    #[serde(default = "default_color")]
    pub color: String,
    #[serde(default)]
    pub is_recurring_instance: bool,
}

/// The caller-supplied part of a new event. The store assigns the id, the
/// family id and the instance flag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventInput {
    pub title: String,
    pub date: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub recurrence: Recurrence,
    #[serde(default = "default_color")]
    pub color: String,
}

fn default_color() -> String {
    DEFAULT_COLOR.to_string()
}

impl EventInput {
    pub fn new(title: impl Into<String>, date: DateTime<Utc>) -> Self {
        Self {
            title: title.into(),
            date,
            description: None,
            recurrence: Recurrence::None,
            color: default_color(),
        }
    }

    pub fn with_recurrence(mut self, recurrence: Recurrence) -> Self {
        self.recurrence = recurrence;
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = color.into();
        self
    }

    /// Turn the input into a base event carrying `id`.
    pub fn into_event(self, id: String) -> Event {
        Event {
            family_id: id.clone(),
            id,
            title: self.title,
            date: self.date,
            description: self.description,
            recurrence: self.recurrence,
            color: self.color,
            is_recurring_instance: false,
        }
    }
}

impl Event {
    /// Re-root this event as the base of its own family under `id`.
    pub(crate) fn into_base(mut self, id: String) -> Event {
        self.family_id = id.clone();
        self.id = id;
        self.is_recurring_instance = false;
        self
    }
}

/// The id portion before the first separator, or the whole id if none.
///
/// Only used to recover family ids for records persisted before `familyId`
/// existed, and for ids that no longer match a stored event.
pub fn base_id_of(id: &str) -> &str {
    id.split(SEPARATOR).next().unwrap_or(id)
}

/// Generate a fresh event id. Never contains [`SEPARATOR`].
pub fn new_event_id() -> String {
    Uuid::new_v4().simple().to_string()
}

/// Human-readable date line for an event, e.g. `"Mar 1, 2026 at 09:00"`.
pub fn format_event_date(event: &Event) -> String {
    event.date.format("%b %-d, %Y at %H:%M").to_string()
}
