//! Search and calendar-view filtering of an already materialized event list.
//!
//! The text filter runs first, then the view's date range. Both are stable: the
//! output keeps the input order.

use std::ops::RangeInclusive;
use std::str::FromStr;

use chrono::{Datelike, Days, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::calendar::{days_in_month, exact_date};
use crate::config::WeekStart;
use crate::error::ScheduleError;
use crate::model::{Event, EventTemplate};

/// Which slice of the calendar the UI is showing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewGranularity {
    Week,
    Month,
    /// No date restriction.
    #[default]
    All,
}

impl FromStr for ViewGranularity {
    type Err = ScheduleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "week" => Ok(Self::Week),
            "month" => Ok(Self::Month),
            "all" | "" => Ok(Self::All),
            other => Err(ScheduleError::InvalidOption(format!(
                "unknown view '{}', expected week, month or all",
                other
            ))),
        }
    }
}

/// Filter with the default week start (Sunday).
pub fn filter_events<'a>(
    events: &'a [Event],
    search_term: &str,
    reference_date: NaiveDate,
    view: ViewGranularity,
) -> Vec<&'a Event> {
    filter_events_with(events, search_term, reference_date, view, WeekStart::default())
}

/// Events matching `search_term` whose date falls inside `view` around `reference_date`.
///
/// The term matches case-insensitively against title, description or location;
/// an empty term matches everything.
pub fn filter_events_with<'a>(
    events: &'a [Event],
    search_term: &str,
    reference_date: NaiveDate,
    view: ViewGranularity,
    week_start: WeekStart,
) -> Vec<&'a Event> {
    let needle = search_term.to_lowercase();
    let range = view_range(reference_date, view, week_start);

    events
        .iter()
        .filter(|event| matches_term(&event.template, &needle))
        .filter(|event| {
            range
                .as_ref()
                .is_none_or(|range| range.contains(&event.template.date))
        })
        .collect()
}

/// The inclusive date range a view covers, or `None` when it is unrestricted.
pub fn view_range(
    reference_date: NaiveDate,
    view: ViewGranularity,
    week_start: WeekStart,
) -> Option<RangeInclusive<NaiveDate>> {
    match view {
        ViewGranularity::Week => {
            let offset = u64::from(week_start.days_into_week(reference_date));
            let first = reference_date.checked_sub_days(Days::new(offset))?;
            let last = first.checked_add_days(Days::new(6))?;
            Some(first..=last)
        }
        ViewGranularity::Month => {
            let (year, month) = (reference_date.year(), reference_date.month());
            let first = exact_date(year, month, 1)?;
            let last = exact_date(year, month, days_in_month(year, month))?;
            Some(first..=last)
        }
        ViewGranularity::All => None,
    }
}

fn matches_term(template: &EventTemplate, needle: &str) -> bool {
    [&template.title, &template.description, &template.location]
        .iter()
        .any(|field| field.to_lowercase().contains(needle))
}
