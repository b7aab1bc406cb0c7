//! # schedule-engine
//!
//! Deterministic recurrence expansion and scheduling-conflict detection for a
//! calendar app.
//!
//! Dates are plain calendar dates and times are local wall-clock times; there is
//! no time-zone handling. Every operation is a pure function over its inputs, so
//! the same event always expands to the same occurrences.
//!
//! ## Modules
//!
//! - [`expander`]: repeating event → ordered list of dated occurrences
//! - [`overlap`]: find scheduled events that collide with a candidate
//! - [`filter`]: search-term and week/month view filtering
//! - [`calendar`]: month/year field arithmetic that never clamps
//! - [`config`]: recurrence horizon, week start and conflict policy
//! - [`model`]: events, repeat rules, wall times
//! - [`error`]: Error types

pub mod calendar;
pub mod config;
pub mod error;
pub mod expander;
pub mod filter;
pub mod model;
pub mod overlap;

pub use config::{EngineConfig, HorizonPolicy, WeekStart, DEFAULT_HORIZON_MONTHS};
pub use error::ScheduleError;
pub use expander::{expand, expand_until, expand_with_horizon, occurrence_dates};
pub use filter::{filter_events, filter_events_with, ViewGranularity};
pub use model::{
    parse_boundary, Candidate, Event, EventId, EventTemplate, RepeatEnd, RepeatRule, RepeatType,
    Scheduled, SeriesId, TimeInterval, WallTime,
};
pub use overlap::{find_conflicts, find_conflicts_with_policy, find_first_conflict, ExpansionPolicy};
