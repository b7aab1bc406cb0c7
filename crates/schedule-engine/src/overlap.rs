//! Screen a candidate event against already-scheduled events.
//!
//! Each event is reduced to the local wall-clock interval on its date. Two
//! intervals conflict when `a.start < b.end && b.start < a.end`; events that only
//! touch (one ends exactly when the other starts) are NOT conflicts.
//!
//! A repeating candidate is also checked at its future occurrences within a
//! one-year lookahead. The occurrences are visited in date order and the first
//! one that collides with anything decides the result; conflicts at later
//! occurrences are not merged in.

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::calendar::one_year_later;
use crate::expander::occurrence_dates;
use crate::model::{Event, EventTemplate, RepeatEnd, RepeatType, Scheduled, TimeInterval};

/// How a repeating candidate is expanded for conflict screening.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ExpansionPolicy {
    /// Same stepping rules as the recurrence expander, for every repeat type.
    #[default]
    Unified,
    /// Only weekly candidates expand, always in 7-day steps regardless of the
    /// interval. Matches the older screening behavior of the browser app.
    LegacyWeekly,
}

/// The first colliding occurrence of a candidate and the events it collides with.
#[derive(Debug, Clone, PartialEq)]
pub struct Conflict<'a> {
    pub occurrence: NaiveDate,
    pub interval: TimeInterval,
    pub events: Vec<&'a Event>,
}

impl Conflict<'_> {
    /// Minutes shared between the colliding occurrence and `event`.
    pub fn overlap_minutes(&self, event: &Event) -> Option<i64> {
        self.interval.overlap_minutes(&event.template.time_interval())
    }
}

/// Existing events that collide with `candidate` or one of its occurrences.
///
/// Events sharing the candidate's id are ignored, so an edited event never
/// conflicts with its own stored original. Returns an empty list when nothing
/// collides.
pub fn find_conflicts<'a, C>(candidate: &C, existing: &'a [Event]) -> Vec<&'a Event>
where
    C: Scheduled + ?Sized,
{
    find_conflicts_with_policy(candidate, existing, ExpansionPolicy::Unified)
}

/// [`find_conflicts`] with an explicit candidate expansion policy.
pub fn find_conflicts_with_policy<'a, C>(
    candidate: &C,
    existing: &'a [Event],
    policy: ExpansionPolicy,
) -> Vec<&'a Event>
where
    C: Scheduled + ?Sized,
{
    find_first_conflict(candidate, existing, policy)
        .map(|conflict| conflict.events)
        .unwrap_or_default()
}

/// Like [`find_conflicts_with_policy`] but also reports which occurrence collided.
pub fn find_first_conflict<'a, C>(
    candidate: &C,
    existing: &'a [Event],
    policy: ExpansionPolicy,
) -> Option<Conflict<'a>>
where
    C: Scheduled + ?Sized,
{
    let template = candidate.template();
    let candidate_id = candidate.event_id();

    for occurrence in screening_dates(template, policy) {
        let interval = template.time_interval_on(occurrence);
        let events: Vec<&Event> = existing
            .iter()
            .filter(|event| Some(&event.id) != candidate_id)
            .filter(|event| event.template.time_interval().overlaps(&interval))
            .collect();

        if !events.is_empty() {
            debug!(
                %occurrence,
                count = events.len(),
                "candidate collides with scheduled events"
            );
            return Some(Conflict {
                occurrence,
                interval,
                events,
            });
        }
    }

    None
}

/// The candidate's own date followed by the occurrences to screen.
pub fn screening_dates(template: &EventTemplate, policy: ExpansionPolicy) -> Vec<NaiveDate> {
    let start = template.date;
    let lookahead = one_year_later(start);

    match policy {
        ExpansionPolicy::Unified => {
            // A rule ending before the lookahead stops there.
            let boundary = match &template.repeat.end_date {
                RepeatEnd::On(end) => {
                    Some(lookahead.map_or(*end, |lookahead| lookahead.min(*end)))
                }
                RepeatEnd::Open => lookahead,
                RepeatEnd::Malformed(_) => None,
            };
            occurrence_dates(start, &template.repeat, boundary).collect()
        }
        ExpansionPolicy::LegacyWeekly => {
            let mut dates = vec![start];
            if template.repeat.kind != RepeatType::Weekly {
                return dates;
            }
            let Some(lookahead) = lookahead else {
                return dates;
            };
            let mut current = start;
            while let Some(next) = current.checked_add_days(Days::new(7)) {
                if next > lookahead {
                    break;
                }
                dates.push(next);
                current = next;
            }
            dates
        }
    }
}
