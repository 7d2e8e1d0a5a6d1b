//! Recurrence expansion -- turns a base event into its materialized family.
//!
//! Instance counts are fixed per recurrence kind; there is no end date or
//! user-chosen count. Dates are always computed from the base date, never
//! from the previous instance, so month-end clamping does not accumulate.

use chrono::{DateTime, Duration, Months, Utc};

use crate::event::{Event, Recurrence, SEPARATOR};

/// Instances generated after a daily base event.
pub const DAILY_INSTANCES: u32 = 30;
/// Instances generated after a weekly base event.
pub const WEEKLY_INSTANCES: u32 = 12;
/// Instances generated after a monthly base event.
pub const MONTHLY_INSTANCES: u32 = 12;

impl Recurrence {
    /// Number of instances generated after the base event.
    pub fn instance_count(self) -> u32 {
        match self {
            Recurrence::None => 0,
            Recurrence::Daily => DAILY_INSTANCES,
            Recurrence::Weekly => WEEKLY_INSTANCES,
            Recurrence::Monthly => MONTHLY_INSTANCES,
        }
    }

    /// Size of a fully expanded family, base included.
    pub fn family_size(self) -> usize {
        self.instance_count() as usize + 1
    }

    /// The date `step` occurrences after `start`.
    ///
    /// Monthly steps use calendar months and clamp to the last day of the
    /// target month (Jan 31 + 1 month = Feb 28). Returns `None` once the
    /// result leaves chrono's representable range.
    pub fn advance(self, start: DateTime<Utc>, step: u32) -> Option<DateTime<Utc>> {
        match self {
            Recurrence::None => (step == 0).then_some(start),
            Recurrence::Daily => start.checked_add_signed(Duration::days(step as i64)),
            Recurrence::Weekly => start.checked_add_signed(Duration::weeks(step as i64)),
            Recurrence::Monthly => start.checked_add_months(Months::new(step)),
        }
    }
}

/// Expand a base event into `[base, instance_1, ..., instance_n]`.
///
/// Instance `i` gets id `"<base.id>_<i>"`, the base's family id, and
/// `is_recurring_instance = true`; every other field is copied from the base.
/// A non-recurring event expands to itself alone.
pub fn expand(base: &Event) -> Vec<Event> {
    let recurrence = base.recurrence;
    let mut family = Vec::with_capacity(recurrence.family_size());
    family.push(base.clone());

    for step in 1..=recurrence.instance_count() {
        let Some(date) = recurrence.advance(base.date, step) else {
            break;
        };
        family.push(Event {
            id: format!("{}{}{}", base.id, SEPARATOR, step),
            date,
            is_recurring_instance: true,
            ..base.clone()
        });
    }

    family
}
