//! Calendar event model shared by the expander, the overlap detector and the filter.
//!
//! Field names follow the browser app's JSON (`startTime`, `notificationTime`, ...),
//! so values can be exchanged with the UI and storage layers without a mapping step.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{Result, ScheduleError};

/// Canonical `CalendarDate` wire format.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

const WALL_TIME_FORMAT: &str = "%H:%M";
const WALL_TIME_FORMAT_SECONDS: &str = "%H:%M:%S";

/// Parse a strict `YYYY-MM-DD` calendar date.
pub fn parse_date(raw: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), DATE_FORMAT)
        .map_err(|e| ScheduleError::InvalidDate(format!("'{}': {}", raw, e)))
}

/// Parse a raw repeat-end boundary into a calendar date.
///
/// Accepts `YYYY-MM-DD`, or an ISO datetime (`YYYY-MM-DDTHH:MM[:SS]`, optionally
/// with an RFC 3339 offset) whose date part is used. Returns `None` for anything
/// else, including the empty string.
pub fn parse_boundary(raw: &str) -> Option<NaiveDate> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    if let Ok(date) = NaiveDate::parse_from_str(trimmed, DATE_FORMAT) {
        return Some(date);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(dt.date_naive());
    }
    NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%dT%H:%M:%S")
        .or_else(|_| NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%dT%H:%M"))
        .map(|dt| dt.date())
        .ok()
}

// ---------------------------------------------------------------------------
// WallTime
// ---------------------------------------------------------------------------

/// A local time of day, `HH:MM` on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct WallTime(NaiveTime);

impl WallTime {
    pub fn from_hm(hour: u32, minute: u32) -> Option<Self> {
        NaiveTime::from_hms_opt(hour, minute, 0).map(Self)
    }

    pub fn as_naive(&self) -> NaiveTime {
        self.0
    }
}

impl From<NaiveTime> for WallTime {
    fn from(time: NaiveTime) -> Self {
        Self(time)
    }
}

impl FromStr for WallTime {
    type Err = ScheduleError;

    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        NaiveTime::parse_from_str(trimmed, WALL_TIME_FORMAT)
            .or_else(|_| NaiveTime::parse_from_str(trimmed, WALL_TIME_FORMAT_SECONDS))
            .map(Self)
            .map_err(|e| ScheduleError::InvalidTime(format!("'{}': {}", s, e)))
    }
}

impl fmt::Display for WallTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format(WALL_TIME_FORMAT))
    }
}

impl Serialize for WallTime {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for WallTime {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

// ---------------------------------------------------------------------------
// Identities
// ---------------------------------------------------------------------------

/// Opaque identity assigned by the storage layer.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventId(pub String);

/// Opaque correlation key shared by the occurrences of one recurring definition.
///
/// The engine copies it into every occurrence and never reads or generates it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SeriesId(pub String);

macro_rules! string_id {
    ($ty:ident) => {
        impl From<&str> for $ty {
            fn from(s: &str) -> Self {
                Self(s.to_string())
            }
        }

        impl From<String> for $ty {
            fn from(s: String) -> Self {
                Self(s)
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

string_id!(EventId);
string_id!(SeriesId);

// ---------------------------------------------------------------------------
// RepeatRule
// ---------------------------------------------------------------------------

/// Recurrence frequency.
///
/// Any wire value other than the five known ones deserializes to `Unsupported`,
/// which the expander treats as "no further occurrences".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RepeatType {
    #[default]
    None,
    Daily,
    Weekly,
    Monthly,
    Yearly,
    #[serde(other)]
    Unsupported,
}

fn default_interval() -> u32 {
    1
}

/// The `endDate` of a repeat rule as it arrived on the wire.
///
/// A blank or missing value is `Open`; a value that does not parse is kept as
/// `Malformed` so it still bounds expansion to the first occurrence and
/// serializes back unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum RepeatEnd {
    #[default]
    Open,
    On(NaiveDate),
    Malformed(String),
}

impl RepeatEnd {
    pub fn is_open(&self) -> bool {
        matches!(self, Self::Open)
    }

    pub fn date(&self) -> Option<NaiveDate> {
        match self {
            Self::On(date) => Some(*date),
            _ => None,
        }
    }
}

impl From<&str> for RepeatEnd {
    fn from(raw: &str) -> Self {
        if raw.trim().is_empty() {
            return Self::Open;
        }
        match parse_boundary(raw) {
            Some(date) => Self::On(date),
            None => Self::Malformed(raw.to_string()),
        }
    }
}

impl Serialize for RepeatEnd {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Self::Open => serializer.serialize_none(),
            Self::On(date) => serializer.collect_str(&date.format(DATE_FORMAT)),
            Self::Malformed(raw) => serializer.serialize_str(raw),
        }
    }
}

impl<'de> Deserialize<'de> for RepeatEnd {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw: Option<String> = Option::deserialize(deserializer)?;
        Ok(raw.as_deref().map_or(Self::Open, Self::from))
    }
}

/// "Repeat every `interval` days/weeks/months/years, until `end_date`".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepeatRule {
    #[serde(rename = "type")]
    pub kind: RepeatType,
    #[serde(default = "default_interval")]
    pub interval: u32,
    #[serde(default, skip_serializing_if = "RepeatEnd::is_open")]
    pub end_date: RepeatEnd,
}

impl Default for RepeatRule {
    fn default() -> Self {
        Self::none()
    }
}

impl RepeatRule {
    pub fn none() -> Self {
        Self {
            kind: RepeatType::None,
            interval: 1,
            end_date: RepeatEnd::Open,
        }
    }

    pub fn new(kind: RepeatType, interval: u32) -> Self {
        Self {
            kind,
            interval,
            end_date: RepeatEnd::Open,
        }
    }

    pub fn until(mut self, end_date: NaiveDate) -> Self {
        self.end_date = RepeatEnd::On(end_date);
        self
    }

    pub fn is_repeating(&self) -> bool {
        self.kind != RepeatType::None
    }

    /// The end date that actually bounds expansion; always `None` for `none`.
    pub fn effective_end_date(&self) -> Option<NaiveDate> {
        if self.is_repeating() {
            self.end_date.date()
        } else {
            None
        }
    }

    /// Check the rule invariants a form layer should enforce before saving.
    ///
    /// The expander itself tolerates invalid rules; this is for callers that want
    /// to reject them up front.
    pub fn validate(&self) -> Result<()> {
        match self.kind {
            RepeatType::None if !self.end_date.is_open() => Err(ScheduleError::InvalidRule(
                "a non-repeating rule cannot carry an end date".to_string(),
            )),
            RepeatType::None => Ok(()),
            RepeatType::Unsupported => Err(ScheduleError::InvalidRule(
                "unsupported repeat type".to_string(),
            )),
            _ if self.interval == 0 => Err(ScheduleError::InvalidRule(
                "interval must be at least 1".to_string(),
            )),
            _ => match &self.end_date {
                RepeatEnd::Malformed(raw) => Err(ScheduleError::InvalidRule(format!(
                    "unparseable end date '{}'",
                    raw
                ))),
                _ => Ok(()),
            },
        }
    }
}

// ---------------------------------------------------------------------------
// Events
// ---------------------------------------------------------------------------

/// An unsaved event as submitted by the event form; also the shape of one occurrence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventTemplate {
    pub title: String,
    pub date: NaiveDate,
    pub start_time: WallTime,
    pub end_time: WallTime,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub repeat: RepeatRule,
    /// Minutes before the start at which the UI notifies.
    #[serde(default)]
    pub notification_time: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub series_id: Option<SeriesId>,
}

impl EventTemplate {
    pub fn new(
        title: impl Into<String>,
        date: NaiveDate,
        start_time: WallTime,
        end_time: WallTime,
    ) -> Self {
        Self {
            title: title.into(),
            date,
            start_time,
            end_time,
            description: String::new(),
            location: String::new(),
            category: String::new(),
            repeat: RepeatRule::none(),
            notification_time: 0,
            series_id: None,
        }
    }

    pub fn with_repeat(mut self, repeat: RepeatRule) -> Self {
        self.repeat = repeat;
        self
    }

    /// A copy of this template moved to `date`.
    pub fn on(&self, date: NaiveDate) -> Self {
        Self {
            date,
            ..self.clone()
        }
    }

    pub fn time_interval(&self) -> TimeInterval {
        self.time_interval_on(self.date)
    }

    /// The interval this event's wall times would occupy on `date`.
    pub fn time_interval_on(&self, date: NaiveDate) -> TimeInterval {
        TimeInterval {
            start: date.and_time(self.start_time.as_naive()),
            end: date.and_time(self.end_time.as_naive()),
        }
    }
}

/// A stored event: a template plus the identity storage assigned to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    pub id: EventId,
    #[serde(flatten)]
    pub template: EventTemplate,
}

impl Event {
    pub fn new(id: impl Into<EventId>, template: EventTemplate) -> Self {
        Self {
            id: id.into(),
            template,
        }
    }
}

/// An event submitted for conflict screening: new (no id) or edited (has id).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candidate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<EventId>,
    #[serde(flatten)]
    pub template: EventTemplate,
}

impl From<EventTemplate> for Candidate {
    fn from(template: EventTemplate) -> Self {
        Self { id: None, template }
    }
}

impl From<Event> for Candidate {
    fn from(event: Event) -> Self {
        Self {
            id: Some(event.id),
            template: event.template,
        }
    }
}

/// Anything the overlap detector can screen.
pub trait Scheduled {
    fn event_id(&self) -> Option<&EventId>;
    fn template(&self) -> &EventTemplate;
}

impl Scheduled for EventTemplate {
    fn event_id(&self) -> Option<&EventId> {
        None
    }

    fn template(&self) -> &EventTemplate {
        self
    }
}

impl Scheduled for Event {
    fn event_id(&self) -> Option<&EventId> {
        Some(&self.id)
    }

    fn template(&self) -> &EventTemplate {
        &self.template
    }
}

impl Scheduled for Candidate {
    fn event_id(&self) -> Option<&EventId> {
        self.id.as_ref()
    }

    fn template(&self) -> &EventTemplate {
        &self.template
    }
}

// ---------------------------------------------------------------------------
// TimeInterval
// ---------------------------------------------------------------------------

/// The local wall-clock span of one event on its date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeInterval {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl TimeInterval {
    /// Half-open overlap: `self.start < other.end && other.start < self.end`.
    ///
    /// Intervals that only touch at an endpoint do not overlap.
    pub fn overlaps(&self, other: &TimeInterval) -> bool {
        self.start < other.end && other.start < self.end
    }

    /// Length of the shared span in minutes, or `None` if the intervals do not overlap.
    pub fn overlap_minutes(&self, other: &TimeInterval) -> Option<i64> {
        if !self.overlaps(other) {
            return None;
        }
        let start = self.start.max(other.start);
        let end = self.end.min(other.end);
        Some((end - start).num_minutes())
    }
}
