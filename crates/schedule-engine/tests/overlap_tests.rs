//! Tests for scheduling-conflict detection.

use chrono::NaiveDate;
use schedule_engine::model::{
    Candidate, Event, EventTemplate, RepeatEnd, RepeatRule, RepeatType, TimeInterval, WallTime,
};
use schedule_engine::{
    find_conflicts, find_conflicts_with_policy, find_first_conflict, ExpansionPolicy,
};

fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

fn time(s: &str) -> WallTime {
    s.parse().unwrap()
}

/// Helper to create a template on `day` between two `HH:MM` wall times.
fn template(day: &str, start: &str, end: &str) -> EventTemplate {
    EventTemplate::new("Meeting", date(day), time(start), time(end))
}

fn event(id: &str, day: &str, start: &str, end: &str) -> Event {
    Event::new(id, template(day, start, end))
}

fn repeating(day: &str, start: &str, end: &str, kind: RepeatType, interval: u32) -> EventTemplate {
    template(day, start, end).with_repeat(RepeatRule::new(kind, interval))
}

fn ids(events: &[&Event]) -> Vec<String> {
    events.iter().map(|e| e.id.to_string()).collect()
}

// ---------------------------------------------------------------------------
// Interval predicate
// ---------------------------------------------------------------------------

#[test]
fn adjacent_events_not_a_conflict() {
    // 09:00-10:00 and 10:00-11:00 share only the 10:00 instant.
    let existing = vec![event("1", "2025-10-15", "10:00", "11:00")];
    let candidate = template("2025-10-15", "09:00", "10:00");

    assert!(find_conflicts(&candidate, &existing).is_empty());
}

#[test]
fn partial_overlap_is_a_conflict() {
    let existing = vec![event("1", "2025-10-15", "10:00", "11:00")];
    let candidate = template("2025-10-15", "09:00", "10:30");

    assert_eq!(ids(&find_conflicts(&candidate, &existing)), ["1"]);
}

#[test]
fn contained_event_is_a_conflict() {
    let existing = vec![event("1", "2025-10-15", "09:00", "12:00")];
    let candidate = template("2025-10-15", "10:00", "11:00");

    assert_eq!(ids(&find_conflicts(&candidate, &existing)), ["1"]);
}

#[test]
fn same_times_on_different_dates_do_not_conflict() {
    let existing = vec![event("1", "2025-10-16", "09:00", "10:00")];
    let candidate = template("2025-10-15", "09:00", "10:00");

    assert!(find_conflicts(&candidate, &existing).is_empty());
}

#[test]
fn overlap_minutes_measures_shared_span() {
    let a = template("2025-10-15", "09:00", "10:30").time_interval();
    let b = template("2025-10-15", "10:00", "11:00").time_interval();
    let c = template("2025-10-15", "10:30", "11:00").time_interval();

    assert_eq!(a.overlap_minutes(&b), Some(30));
    assert_eq!(a.overlap_minutes(&c), None);
}

#[test]
fn time_interval_combines_date_and_wall_times() {
    let interval: TimeInterval = template("2025-10-15", "09:15", "10:45").time_interval();

    assert_eq!(interval.start, date("2025-10-15").and_hms_opt(9, 15, 0).unwrap());
    assert_eq!(interval.end, date("2025-10-15").and_hms_opt(10, 45, 0).unwrap());
}

// ---------------------------------------------------------------------------
// Result shape
// ---------------------------------------------------------------------------

#[test]
fn empty_collection_no_conflicts() {
    let candidate = template("2025-10-15", "09:00", "10:00");

    assert!(find_conflicts(&candidate, &[]).is_empty());
}

#[test]
fn all_colliding_events_returned_in_input_order() {
    let existing = vec![
        event("1", "2025-10-15", "09:30", "10:30"),
        event("2", "2025-10-15", "13:00", "14:00"),
        event("3", "2025-10-15", "08:00", "09:15"),
    ];
    let candidate = template("2025-10-15", "09:00", "10:00");

    assert_eq!(ids(&find_conflicts(&candidate, &existing)), ["1", "3"]);
}

// ---------------------------------------------------------------------------
// Identity
// ---------------------------------------------------------------------------

#[test]
fn edited_event_never_conflicts_with_itself() {
    let existing = vec![event("1", "2025-10-15", "09:00", "10:00")];
    let edited = event("1", "2025-10-15", "09:00", "11:00");

    assert!(find_conflicts(&edited, &existing).is_empty());
}

#[test]
fn edited_event_still_conflicts_with_others() {
    let existing = vec![
        event("1", "2025-10-15", "09:00", "10:00"),
        event("2", "2025-10-15", "10:00", "11:00"),
    ];
    let edited = Candidate::from(event("1", "2025-10-15", "09:00", "10:30"));

    assert_eq!(ids(&find_conflicts(&edited, &existing)), ["2"]);
}

#[test]
fn unsaved_candidate_has_no_identity_to_exclude() {
    let existing = vec![event("1", "2025-10-15", "09:00", "10:00")];
    let candidate = Candidate::from(template("2025-10-15", "09:00", "10:00"));

    assert_eq!(ids(&find_conflicts(&candidate, &existing)), ["1"]);
}

// ---------------------------------------------------------------------------
// Repeating candidates
// ---------------------------------------------------------------------------

#[test]
fn own_date_conflict_takes_priority() {
    // 2025-10-01 is a Wednesday.
    let existing = vec![
        event("later", "2025-10-08", "09:00", "10:00"),
        event("same-day", "2025-10-01", "09:30", "10:30"),
    ];
    let candidate = repeating("2025-10-01", "09:00", "10:00", RepeatType::Weekly, 1);

    assert_eq!(ids(&find_conflicts(&candidate, &existing)), ["same-day"]);
}

#[test]
fn first_colliding_occurrence_wins_without_union() {
    let existing = vec![
        event("week-3", "2025-10-15", "09:00", "10:00"),
        event("week-2", "2025-10-08", "09:30", "10:30"),
    ];
    let candidate = repeating("2025-10-01", "09:00", "10:00", RepeatType::Weekly, 1);

    let conflict = find_first_conflict(&candidate, &existing, ExpansionPolicy::Unified)
        .expect("should collide at week 2");

    assert_eq!(conflict.occurrence, date("2025-10-08"));
    assert_eq!(ids(&conflict.events), ["week-2"]);
    assert_eq!(conflict.overlap_minutes(conflict.events[0]), Some(30));
}

#[test]
fn lookahead_covers_one_year() {
    // 2025-01-06 + 52 weeks = 2026-01-05, inside the lookahead ending 2026-01-06.
    let inside = vec![event("1", "2026-01-05", "09:00", "10:00")];
    let outside = vec![event("1", "2026-01-12", "09:00", "10:00")];
    let candidate = repeating("2025-01-06", "09:00", "10:00", RepeatType::Weekly, 1);

    assert_eq!(ids(&find_conflicts(&candidate, &inside)), ["1"]);
    assert!(find_conflicts(&candidate, &outside).is_empty());
}

#[test]
fn monthly_candidate_uses_full_rule_set() {
    let existing = vec![event("1", "2025-03-31", "09:00", "10:00")];
    let candidate = repeating("2025-01-31", "09:00", "10:00", RepeatType::Monthly, 1);

    assert_eq!(ids(&find_conflicts(&candidate, &existing)), ["1"]);
}

#[test]
fn monthly_candidate_skips_missing_days() {
    // No Feb 31, and the candidate must not be clamped onto Feb 28.
    let existing = vec![event("1", "2025-02-28", "09:00", "10:00")];
    let candidate = repeating("2025-01-31", "09:00", "10:00", RepeatType::Monthly, 1);

    assert!(find_conflicts(&candidate, &existing).is_empty());
}

#[test]
fn candidate_end_date_limits_lookahead() {
    let existing = vec![event("1", "2025-01-27", "09:00", "10:00")];
    let mut candidate = repeating("2025-01-06", "09:00", "10:00", RepeatType::Weekly, 1);
    candidate.repeat = candidate.repeat.clone().until(date("2025-01-20"));

    assert!(find_conflicts(&candidate, &existing).is_empty());
}

#[test]
fn malformed_end_date_screens_only_the_first_occurrence() {
    let existing = vec![event("1", "2025-01-13", "09:00", "10:00")];
    let mut candidate = repeating("2025-01-06", "09:00", "10:00", RepeatType::Weekly, 1);
    candidate.repeat.end_date = RepeatEnd::Malformed("2025-13-01".to_string());

    assert!(find_conflicts(&candidate, &existing).is_empty());
}

// ---------------------------------------------------------------------------
// Legacy weekly-only screening
// ---------------------------------------------------------------------------

#[test]
fn legacy_policy_ignores_non_weekly_rules() {
    let existing = vec![event("1", "2025-03-31", "09:00", "10:00")];
    let candidate = repeating("2025-01-31", "09:00", "10:00", RepeatType::Monthly, 1);

    let legacy = find_conflicts_with_policy(&candidate, &existing, ExpansionPolicy::LegacyWeekly);
    let unified = find_conflicts_with_policy(&candidate, &existing, ExpansionPolicy::Unified);

    assert!(legacy.is_empty(), "legacy screening only expands weekly rules");
    assert_eq!(ids(&unified), ["1"]);
}

#[test]
fn legacy_policy_steps_one_week_regardless_of_interval() {
    let existing = vec![event("1", "2025-10-08", "09:00", "10:00")];
    let candidate = repeating("2025-10-01", "09:00", "10:00", RepeatType::Weekly, 2);

    let legacy = find_conflicts_with_policy(&candidate, &existing, ExpansionPolicy::LegacyWeekly);
    let unified = find_conflicts_with_policy(&candidate, &existing, ExpansionPolicy::Unified);

    assert_eq!(ids(&legacy), ["1"]);
    assert!(unified.is_empty(), "biweekly rule has no occurrence on 2025-10-08");
}

#[test]
fn legacy_policy_ignores_end_date() {
    let existing = vec![event("1", "2025-01-27", "09:00", "10:00")];
    let mut candidate = repeating("2025-01-06", "09:00", "10:00", RepeatType::Weekly, 1);
    candidate.repeat = candidate.repeat.clone().until(date("2025-01-20"));

    let legacy = find_conflicts_with_policy(&candidate, &existing, ExpansionPolicy::LegacyWeekly);

    assert_eq!(ids(&legacy), ["1"]);
}
