//! Recurrence expansion: turns one repeating event into its concrete occurrences.
//!
//! Stepping works on calendar fields. Monthly and yearly rules keep the start
//! date's day-of-month (and month, for yearly); a target month that lacks that
//! day is skipped rather than clamped, so a rule starting on Jan 31 produces
//! Jan 31, Mar 31, May 31, ...
//!
//! Every function here is total: malformed boundaries, inverted boundaries and
//! unsupported rules all degrade to "the first occurrence only".

use chrono::{Datelike, Days, NaiveDate};
use tracing::{debug, warn};

use crate::calendar::{exact_date, shift_month};
use crate::config::HorizonPolicy;
use crate::model::{parse_boundary, EventTemplate, RepeatEnd, RepeatRule, RepeatType};

/// Expand `template` into its occurrences up to a raw boundary string.
///
/// - `repeat.type = none` returns `[template]` and ignores the boundary.
/// - An absent or unparseable boundary, or one before the start date, yields
///   only the first occurrence.
/// - Otherwise occurrences are generated while `date <= boundary` (inclusive).
///
/// The result is ascending by date and always starts with the template itself.
pub fn expand(template: &EventTemplate, repeat_end_date: Option<&str>) -> Vec<EventTemplate> {
    if !template.repeat.is_repeating() {
        return vec![template.clone()];
    }

    let boundary = repeat_end_date.and_then(|raw| {
        let parsed = parse_boundary(raw);
        if parsed.is_none() {
            debug!(raw, "unparseable repeat end date, keeping the first occurrence only");
        }
        parsed
    });

    expand_until(template, boundary)
}

/// Expand `template` up to an already-parsed inclusive boundary.
pub fn expand_until(template: &EventTemplate, boundary: Option<NaiveDate>) -> Vec<EventTemplate> {
    if !template.repeat.is_repeating() {
        return vec![template.clone()];
    }

    let occurrences: Vec<EventTemplate> = occurrence_dates(template.date, &template.repeat, boundary)
        .map(|date| template.on(date))
        .collect();

    debug!(
        kind = ?template.repeat.kind,
        interval = template.repeat.interval,
        ?boundary,
        count = occurrences.len(),
        "expanded recurrence"
    );

    occurrences
}

/// Expand using the rule's own end date, falling back to `horizon` when the rule
/// has none.
///
/// An end date that is present but unparseable does not fall back: the result is
/// the first occurrence only, as with [`expand`].
pub fn expand_with_horizon(template: &EventTemplate, horizon: &HorizonPolicy) -> Vec<EventTemplate> {
    let boundary = match &template.repeat.end_date {
        RepeatEnd::On(date) => Some(*date),
        RepeatEnd::Open => horizon.resolve(template.date),
        RepeatEnd::Malformed(raw) => {
            debug!(
                raw = raw.as_str(),
                "unparseable repeat end date, keeping the first occurrence only"
            );
            None
        }
    };
    expand_until(template, boundary)
}

/// Lazily enumerate occurrence dates of `rule` starting at `start`.
///
/// The first item is always `start`. Later items follow the rule's step function
/// and stop at the first candidate beyond `boundary`.
pub fn occurrence_dates(
    start: NaiveDate,
    rule: &RepeatRule,
    boundary: Option<NaiveDate>,
) -> Occurrences {
    Occurrences {
        start,
        kind: rule.kind,
        interval: u64::from(rule.interval),
        boundary,
        steps: 0,
        started: false,
        done: false,
    }
}

/// Iterator returned by [`occurrence_dates`].
#[derive(Debug, Clone)]
pub struct Occurrences {
    start: NaiveDate,
    kind: RepeatType,
    interval: u64,
    boundary: Option<NaiveDate>,
    steps: u64,
    started: bool,
    done: bool,
}

/// Outcome of stepping `n` intervals away from the start date.
enum Step {
    /// A valid date.
    Date(NaiveDate),
    /// The target month has no such day; carries the first day of that month.
    Gap(NaiveDate),
    /// The rule cannot advance any further.
    Exhausted,
}

impl Occurrences {
    fn step(&self, n: u64) -> Step {
        if self.interval == 0 {
            warn!(kind = ?self.kind, "repeat interval is 0, stopping expansion");
            return Step::Exhausted;
        }
        let Some(units) = n.checked_mul(self.interval) else {
            return Step::Exhausted;
        };

        let date = match self.kind {
            RepeatType::Daily => self.start.checked_add_days(Days::new(units)),
            RepeatType::Weekly => units
                .checked_mul(7)
                .and_then(|days| self.start.checked_add_days(Days::new(days))),
            RepeatType::Monthly => return self.month_step(units),
            RepeatType::Yearly => return self.year_step(units),
            RepeatType::None => None,
            RepeatType::Unsupported => {
                warn!("unsupported repeat type, stopping expansion");
                None
            }
        };

        date.map_or(Step::Exhausted, Step::Date)
    }

    fn month_step(&self, months: u64) -> Step {
        let target = i64::try_from(months)
            .ok()
            .and_then(|months| shift_month(self.start.year(), self.start.month(), months));
        let Some((year, month)) = target else {
            return Step::Exhausted;
        };
        self.land(year, month)
    }

    fn year_step(&self, years: u64) -> Step {
        let target = i32::try_from(years)
            .ok()
            .and_then(|years| self.start.year().checked_add(years));
        let Some(year) = target else {
            return Step::Exhausted;
        };
        self.land(year, self.start.month())
    }

    /// Place the start's day-of-month in `year-month`, or report the gap.
    fn land(&self, year: i32, month: u32) -> Step {
        let Some(month_start) = NaiveDate::from_ymd_opt(year, month, 1) else {
            return Step::Exhausted;
        };
        match exact_date(year, month, self.start.day()) {
            Some(date) => Step::Date(date),
            None => Step::Gap(month_start),
        }
    }
}

impl Iterator for Occurrences {
    type Item = NaiveDate;

    fn next(&mut self) -> Option<NaiveDate> {
        if self.done {
            return None;
        }
        if !self.started {
            self.started = true;
            return Some(self.start);
        }

        let Some(boundary) = self.boundary else {
            self.done = true;
            return None;
        };

        // Gaps are skipped until a valid date turns up or the calendar moves past
        // the boundary. Month starts grow strictly with each step, so this ends.
        loop {
            self.steps += 1;
            match self.step(self.steps) {
                Step::Date(date) if date <= boundary => return Some(date),
                Step::Gap(month_start) if month_start <= boundary => continue,
                _ => {
                    self.done = true;
                    return None;
                }
            }
        }
    }
}
