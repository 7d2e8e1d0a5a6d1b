//! Calendar arithmetic for the month view.

use chrono::{Datelike, Days, NaiveDate};

use crate::error::{Result, StoreError};

/// First and last day of a month.
pub fn month_bounds(year: i32, month: u32) -> Result<(NaiveDate, NaiveDate)> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)
        .ok_or_else(|| StoreError::InvalidDate(format!("{}-{:02}", year, month)))?;
    let next = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)
    };
    let last = next
        .and_then(|d| d.pred_opt())
        .ok_or_else(|| StoreError::InvalidDate(format!("{}-{:02}", year, month)))?;
    Ok((first, last))
}

/// The Sunday-first weeks shown for a month, padded with days from the
/// neighbouring months so every week is complete.
pub fn month_grid(year: i32, month: u32) -> Result<Vec<[NaiveDate; 7]>> {
    let (first, last) = month_bounds(year, month)?;
    let lead = first.weekday().num_days_from_sunday() as u64;
    let trail = 6 - last.weekday().num_days_from_sunday() as u64;

    let out_of_range = || StoreError::InvalidDate(format!("{}-{:02}", year, month));
    let start = first.checked_sub_days(Days::new(lead)).ok_or_else(out_of_range)?;
    let end = last.checked_add_days(Days::new(trail)).ok_or_else(out_of_range)?;

    let days: Vec<NaiveDate> = start.iter_days().take_while(|d| *d <= end).collect();
    Ok(days
        .chunks_exact(7)
        .map(|week| [week[0], week[1], week[2], week[3], week[4], week[5], week[6]])
        .collect())
}
