//! WASM bindings for schedule-engine.
//!
//! Exposes recurrence expansion, conflict screening and view filtering to the
//! browser calendar via `wasm-bindgen`. Events cross the boundary as JSON strings
//! in the app's own shape (`startTime`, `repeat.type`, ...), so the UI can pass
//! its form state and event list straight through.
//!
//! ## Build process
//!
//! ```sh
//! cargo build -p schedule-engine-wasm --target wasm32-unknown-unknown --release
//! wasm-bindgen --target web --out-dir web/src/wasm/ \
//!   target/wasm32-unknown-unknown/release/schedule_engine_wasm.wasm
//! ```

use schedule_engine::model::{parse_date, Candidate, Event, EventTemplate};
use schedule_engine::{EngineConfig, ViewGranularity};
use serde::de::DeserializeOwned;
use serde::Serialize;
use wasm_bindgen::prelude::*;

// ---------------------------------------------------------------------------
// Helpers: JSON in, JSON out
// ---------------------------------------------------------------------------

fn from_json<T: DeserializeOwned>(json: &str, what: &str) -> Result<T, JsValue> {
    serde_json::from_str(json).map_err(|e| JsValue::from_str(&format!("Invalid {} JSON: {}", what, e)))
}

fn to_json<T: Serialize + ?Sized>(value: &T) -> Result<String, JsValue> {
    serde_json::to_string(value)
        .map_err(|e| JsValue::from_str(&format!("Serialization error: {}", e)))
}

fn parse_config(config_json: Option<String>) -> Result<EngineConfig, JsValue> {
    match config_json.as_deref() {
        Some(json) if !json.trim().is_empty() => from_json(json, "config"),
        _ => Ok(EngineConfig::default()),
    }
}

// ---------------------------------------------------------------------------
// WASM exports
// ---------------------------------------------------------------------------

/// Expand an event template into its occurrences.
///
/// `template_json` is one event form object. `repeat_end_date` is the raw
/// boundary (`YYYY-MM-DD`); a missing or malformed boundary yields only the
/// first occurrence. Returns a JSON array of event objects, one per occurrence.
#[wasm_bindgen(js_name = "expandEvent")]
pub fn expand_event(template_json: &str, repeat_end_date: Option<String>) -> Result<String, JsValue> {
    let template: EventTemplate = from_json(template_json, "event")?;
    let occurrences = schedule_engine::expand(&template, repeat_end_date.as_deref());
    to_json(&occurrences)
}

/// Expand using the event's own `repeat.endDate`, or the configured horizon.
///
/// `config_json` is an optional `EngineConfig` object, e.g.
/// `{"horizon": {"relative": {"months": 6}}}`.
#[wasm_bindgen(js_name = "expandEventWithHorizon")]
pub fn expand_event_with_horizon(
    template_json: &str,
    config_json: Option<String>,
) -> Result<String, JsValue> {
    let template: EventTemplate = from_json(template_json, "event")?;
    let config = parse_config(config_json)?;
    let occurrences = schedule_engine::expand_with_horizon(&template, &config.horizon);
    to_json(&occurrences)
}

/// Find stored events that collide with a candidate event.
///
/// `candidate_json` is an event object with or without `id`; `events_json` is a
/// JSON array of stored events. `config_json` may set `conflictPolicy` to
/// `"legacy-weekly"`, which only expands weekly candidates, in fixed 7-day steps.
/// Returns a JSON array of the colliding stored events (empty when there is no
/// conflict).
#[wasm_bindgen(js_name = "findOverlappingEvents")]
pub fn find_overlapping_events(
    candidate_json: &str,
    events_json: &str,
    config_json: Option<String>,
) -> Result<String, JsValue> {
    let candidate: Candidate = from_json(candidate_json, "candidate")?;
    let events: Vec<Event> = from_json(events_json, "events")?;
    let config = parse_config(config_json)?;

    let conflicts =
        schedule_engine::find_conflicts_with_policy(&candidate, &events, config.conflict_policy);
    to_json(&conflicts)
}

/// Filter stored events by search term and calendar view.
///
/// `view` is `"week"`, `"month"` or `"all"`; `reference_date` is `YYYY-MM-DD`.
/// `config_json` may set `weekStart` (`"sunday"` by default).
#[wasm_bindgen(js_name = "filterEvents")]
pub fn filter_events(
    events_json: &str,
    search_term: &str,
    reference_date: &str,
    view: &str,
    config_json: Option<String>,
) -> Result<String, JsValue> {
    let events: Vec<Event> = from_json(events_json, "events")?;
    let reference = parse_date(reference_date).map_err(|e| JsValue::from_str(&e.to_string()))?;
    let view: ViewGranularity = view.parse().map_err(|e: schedule_engine::ScheduleError| {
        JsValue::from_str(&e.to_string())
    })?;
    let config = parse_config(config_json)?;

    let matches = schedule_engine::filter_events_with(
        &events,
        search_term,
        reference,
        view,
        config.week_start,
    );
    to_json(&matches)
}
