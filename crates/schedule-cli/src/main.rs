//! `schedule` CLI: expand recurring events, screen conflicts and filter event
//! lists from the command line. Input and output are the calendar app's JSON.
//!
//! ## Usage
//!
//! ```sh
//! # Expand a repeating event up to an explicit end date (stdin → stdout)
//! cat event.json | schedule expand --until 2025-12-31
//!
//! # Expand using the event's own repeat.endDate, or the configured horizon
//! schedule expand -i event.json --config schedule.json
//!
//! # Which stored events collide with this candidate?
//! schedule conflicts --candidate new.json --events events.json
//!
//! # Human-readable conflict report
//! schedule conflicts --candidate new.json --events events.json --report
//!
//! # Week view around a date, filtered by search term
//! schedule filter -i events.json --date 2025-07-01 --view week --search standup
//! ```

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::io::{self, Read};
use tracing_subscriber::EnvFilter;

use schedule_engine::model::{parse_date, Candidate, Event, EventTemplate};
use schedule_engine::overlap::{find_first_conflict, Conflict};
use schedule_engine::{EngineConfig, ExpansionPolicy, ViewGranularity, WeekStart};

#[derive(Parser)]
#[command(
    name = "schedule",
    version,
    about = "Recurrence expansion and scheduling-conflict detection"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// JSON file with engine settings (horizon, weekStart, conflictPolicy)
    #[arg(long, global = true)]
    config: Option<String>,

    /// Log engine decisions to stderr (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Expand a repeating event into its occurrences
    Expand {
        /// Event JSON file (reads from stdin if omitted)
        #[arg(short, long)]
        input: Option<String>,
        /// Output file (writes to stdout if omitted)
        #[arg(short, long)]
        output: Option<String>,
        /// Inclusive end date (YYYY-MM-DD); defaults to repeat.endDate, then the horizon
        #[arg(long)]
        until: Option<String>,
    },
    /// List stored events that collide with a candidate event
    Conflicts {
        /// Candidate event JSON file (reads from stdin if omitted)
        #[arg(long)]
        candidate: Option<String>,
        /// JSON array of stored events
        #[arg(long)]
        events: String,
        /// Only expand weekly candidates, in fixed 7-day steps
        #[arg(long)]
        legacy_weekly: bool,
        /// Print a human-readable report instead of JSON
        #[arg(long)]
        report: bool,
        /// Output file (writes to stdout if omitted)
        #[arg(short, long)]
        output: Option<String>,
    },
    /// Filter stored events by search term and calendar view
    Filter {
        /// JSON array of stored events (reads from stdin if omitted)
        #[arg(short, long)]
        input: Option<String>,
        /// Output file (writes to stdout if omitted)
        #[arg(short, long)]
        output: Option<String>,
        /// Case-insensitive text matched against title, description and location
        #[arg(long, default_value = "")]
        search: String,
        /// Reference date of the view (YYYY-MM-DD)
        #[arg(long)]
        date: String,
        /// week, month or all
        #[arg(long, default_value = "all")]
        view: String,
        /// sunday or monday (overrides the config file)
        #[arg(long)]
        week_start: Option<String>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Expand {
            input,
            output,
            until,
        } => {
            let json = read_input(input.as_deref())?;
            let template: EventTemplate =
                serde_json::from_str(&json).context("Failed to parse event JSON")?;

            let occurrences = match until.as_deref() {
                Some(until) => schedule_engine::expand(&template, Some(until)),
                None => schedule_engine::expand_with_horizon(&template, &config.horizon),
            };

            write_output(output.as_deref(), &to_pretty_json(&occurrences)?)?;
        }
        Commands::Conflicts {
            candidate,
            events,
            legacy_weekly,
            report,
            output,
        } => {
            let candidate_json = read_input(candidate.as_deref())?;
            let candidate: Candidate = serde_json::from_str(&candidate_json)
                .context("Failed to parse candidate event JSON")?;
            let events_json = read_input(Some(events.as_str()))?;
            let events: Vec<Event> =
                serde_json::from_str(&events_json).context("Failed to parse events JSON")?;

            let policy = if legacy_weekly {
                ExpansionPolicy::LegacyWeekly
            } else {
                config.conflict_policy
            };

            let conflict = find_first_conflict(&candidate, &events, policy);
            let rendered = if report {
                render_report(conflict.as_ref())
            } else {
                let colliding = conflict.map(|c| c.events).unwrap_or_default();
                to_pretty_json(&colliding)?
            };

            write_output(output.as_deref(), &rendered)?;
        }
        Commands::Filter {
            input,
            output,
            search,
            date,
            view,
            week_start,
        } => {
            let json = read_input(input.as_deref())?;
            let events: Vec<Event> =
                serde_json::from_str(&json).context("Failed to parse events JSON")?;
            let reference = parse_date(&date).context("Invalid --date")?;
            let view: ViewGranularity = view.parse().context("Invalid --view")?;
            let week_start = match week_start.as_deref() {
                Some(raw) => raw.parse::<WeekStart>().context("Invalid --week-start")?,
                None => config.week_start,
            };

            let matches =
                schedule_engine::filter_events_with(&events, &search, reference, view, week_start);

            write_output(output.as_deref(), &to_pretty_json(&matches)?)?;
        }
    }

    Ok(())
}

/// Install a stderr `fmt` subscriber. `RUST_LOG` wins over `--verbose`.
fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn load_config(path: Option<&str>) -> Result<EngineConfig> {
    let Some(path) = path else {
        return Ok(EngineConfig::default());
    };
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path))?;
    let config = EngineConfig::from_json(&json)
        .with_context(|| format!("Invalid config file: {}", path))?;
    tracing::debug!(?config, "loaded config");
    Ok(config)
}

/// One line per colliding event, with the shared minutes.
fn render_report(conflict: Option<&Conflict<'_>>) -> String {
    let Some(conflict) = conflict else {
        return "No conflicts.\n".to_string();
    };

    let mut out = format!(
        "Conflicts on {} ({}-{}):\n",
        conflict.occurrence,
        conflict.interval.start.format("%H:%M"),
        conflict.interval.end.format("%H:%M"),
    );
    for event in &conflict.events {
        let minutes = conflict.overlap_minutes(event).unwrap_or_default();
        out.push_str(&format!(
            "  [{}] {} {}-{} ({} min overlap)\n",
            event.id,
            event.template.title,
            event.template.start_time,
            event.template.end_time,
            minutes
        ));
    }
    out
}

fn to_pretty_json<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    let mut json = serde_json::to_string_pretty(value).context("Failed to serialize output")?;
    json.push('\n');
    Ok(json)
}

fn read_input(path: Option<&str>) -> Result<String> {
    match path {
        Some(path) => {
            std::fs::read_to_string(path).with_context(|| format!("Failed to read file: {}", path))
        }
        None => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read from stdin")?;
            Ok(buf)
        }
    }
}

fn write_output(path: Option<&str>, content: &str) -> Result<()> {
    match path {
        Some(path) => {
            std::fs::write(path, content)
                .with_context(|| format!("Failed to write file: {}", path))?;
        }
        None => {
            print!("{}", content);
        }
    }
    Ok(())
}
