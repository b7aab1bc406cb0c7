//! Caller-side policies: recurrence horizon, week start, conflict expansion.
//!
//! All of these are plain values with serde support so the CLI can read them
//! from a JSON file and the browser can pass them through the WASM bindings.

use std::str::FromStr;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::calendar::{days_in_month, shift_month};
use crate::error::ScheduleError;
use crate::overlap::ExpansionPolicy;

/// Months of occurrences generated when a repeating event has no end date.
pub const DEFAULT_HORIZON_MONTHS: u32 = 12;

/// How far to expand a repeating event that has no explicit end date.
///
/// Serialized as `{"fixed": "2025-12-31"}` or `{"relative": {"months": 12}}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HorizonPolicy {
    /// Expand up to an absolute date. Stops producing occurrences once that date
    /// is behind the event's start.
    Fixed(NaiveDate),
    /// Expand up to `months` after the event's start date.
    Relative { months: u32 },
}

impl Default for HorizonPolicy {
    fn default() -> Self {
        Self::Relative {
            months: DEFAULT_HORIZON_MONTHS,
        }
    }
}

impl HorizonPolicy {
    /// The inclusive boundary for an event starting on `start`.
    ///
    /// A relative horizon landing on a missing day (Jan 31 + 1 month) ends on the
    /// last day of the target month. This only bounds the search; occurrences
    /// themselves are never clamped.
    pub fn resolve(&self, start: NaiveDate) -> Option<NaiveDate> {
        match *self {
            Self::Fixed(date) => Some(date),
            Self::Relative { months } => {
                let (year, month) = shift_month(start.year(), start.month(), i64::from(months))?;
                let day = start.day().min(days_in_month(year, month));
                NaiveDate::from_ymd_opt(year, month, day)
            }
        }
    }
}

/// First day of the week used by the week view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WeekStart {
    #[default]
    Sunday,
    Monday,
}

impl WeekStart {
    /// Days between the start of the week and `date`.
    pub fn days_into_week(self, date: NaiveDate) -> u32 {
        match self {
            Self::Sunday => date.weekday().num_days_from_sunday(),
            Self::Monday => date.weekday().num_days_from_monday(),
        }
    }
}

impl FromStr for WeekStart {
    type Err = ScheduleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "sunday" | "sun" => Ok(Self::Sunday),
            "monday" | "mon" => Ok(Self::Monday),
            other => Err(ScheduleError::InvalidOption(format!(
                "unknown week start '{}', expected sunday or monday",
                other
            ))),
        }
    }
}

/// Bundle of caller policies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EngineConfig {
    pub horizon: HorizonPolicy,
    pub week_start: WeekStart,
    pub conflict_policy: ExpansionPolicy,
}

impl EngineConfig {
    pub fn from_json(json: &str) -> crate::error::Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}
