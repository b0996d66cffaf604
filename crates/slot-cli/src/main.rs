//! `slots` CLI: find free meeting slots and answer calendar agent requests.
//!
//! ## Usage
//!
//! ```sh
//! # Free hour-long slots in business hours, busy list from a file
//! slots find --date 2026-03-16 --busy busy.json
//!
//! # Explicit window, busy list on stdin, afternoon only, as a message
//! cat busy.json | slots find --start 2026-03-16T08:00 --end 2026-03-16T20:00 \
//!     --busy - --duration 30 --preference afternoon --text
//!
//! # Answer an action-group request against an iCalendar file
//! slots dispatch -i request.json --ics calendar.ics --now 2026-03-16T08:00
//! ```
//!
//! Configuration comes from `--config` (JSON) and `SLOTS_*` environment
//! variables. Logs go to stderr and are filtered with `RUST_LOG`.

use anyhow::{bail, Context, Result};
use chrono::{NaiveDate, NaiveDateTime, Utc};
use clap::{Parser, Subcommand};
use slot_engine::{
    find_slots_for, render, AgentRequest, Dispatcher, InMemoryCalendar, Preference,
    SchedulerConfig, SlotRequest, TimeInterval,
};
use std::io::{self, Read};
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "slots", version, about = "Free meeting-slot finder")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Scheduler configuration file (JSON)
    #[arg(long, global = true)]
    config: Option<String>,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    json_logs: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Find free slots in a window given a busy list
    Find {
        /// Day to search inside configured business hours
        #[arg(long, conflicts_with_all = ["start", "end"])]
        date: Option<NaiveDate>,
        /// Window start (e.g. 2026-03-16T09:00)
        #[arg(long, requires = "end", value_parser = parse_local)]
        start: Option<NaiveDateTime>,
        /// Window end
        #[arg(long, requires = "start", value_parser = parse_local)]
        end: Option<NaiveDateTime>,
        /// JSON array of {"start","end"} busy intervals ("-" reads stdin)
        #[arg(long)]
        busy: Option<String>,
        /// Meeting length in minutes (defaults to the configured duration)
        #[arg(long)]
        duration: Option<i64>,
        /// morning, afternoon or any
        #[arg(long)]
        preference: Option<Preference>,
        /// Maximum number of slots (defaults to the configured limit)
        #[arg(long)]
        limit: Option<usize>,
        /// Print the agent-facing message instead of JSON
        #[arg(long)]
        text: bool,
    },
    /// Answer an action-group request and print the response envelope
    Dispatch {
        /// Request JSON file (reads from stdin if omitted)
        #[arg(short, long)]
        input: Option<String>,
        /// iCalendar file backing the calendar (empty calendar if omitted)
        #[arg(long)]
        ics: Option<String>,
        /// Current local time, for reproducible answers
        #[arg(long, value_parser = parse_local)]
        now: Option<NaiveDateTime>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.json_logs);

    let config = match cli.config.as_deref() {
        Some(path) => SchedulerConfig::from_file(path)
            .with_context(|| format!("Failed to load config: {}", path))?,
        None => SchedulerConfig::default(),
    }
    .with_env_overrides()
    .context("Invalid SLOTS_* environment override")?;
    debug!(timezone = %config.timezone, "configuration loaded");

    match cli.command {
        Commands::Find {
            date,
            start,
            end,
            busy,
            duration,
            preference,
            limit,
            text,
        } => {
            let window = match (date, start, end) {
                (Some(date), _, _) => config.business_window(date),
                (None, Some(start), Some(end)) => TimeInterval { start, end },
                _ => bail!("Either --date or both --start and --end are required"),
            };
            let busy: Vec<TimeInterval> = match busy.as_deref() {
                None => Vec::new(),
                Some(path) => {
                    let raw = read_input(Some(path).filter(|p| *p != "-"))?;
                    serde_json::from_str(&raw).context("Busy list must be a JSON array of intervals")?
                }
            };
            let request = SlotRequest {
                window,
                duration_minutes: duration.unwrap_or(config.default_duration_minutes),
                preference: preference.unwrap_or(config.default_preference),
                limit: limit.unwrap_or(config.result_limit),
            };
            let slots = find_slots_for(&request, &busy).context("Failed to find slots")?;

            if text {
                println!(
                    "{}",
                    render::slots(
                        window.start.date(),
                        request.duration_minutes,
                        request.preference,
                        &slots
                    )
                );
            } else {
                println!("{}", serde_json::to_string_pretty(&slots)?);
            }
        }
        Commands::Dispatch { input, ics, now } => {
            let raw = read_input(input.as_deref())?;
            let request: AgentRequest =
                serde_json::from_str(&raw).context("Request is not a valid action-group event")?;

            let mut calendar = match ics.as_deref() {
                Some(path) => {
                    let text = read_input(Some(path))?;
                    InMemoryCalendar::from_ics(&text, &config.timezone)
                        .with_context(|| format!("Failed to load calendar: {}", path))?
                }
                None => InMemoryCalendar::default(),
            };
            let now = match now {
                Some(now) => now,
                None => Utc::now()
                    .with_timezone(&config.timezone()?)
                    .naive_local(),
            };

            let response = Dispatcher::new(&config, &mut calendar).handle(&request, now);
            println!("{}", serde_json::to_string_pretty(&response)?);
        }
    }

    Ok(())
}

fn init_tracing(json: bool) {
    let builder = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

/// Naive local date-time with or without seconds.
fn parse_local(raw: &str) -> Result<NaiveDateTime, String> {
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S")
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M"))
        .map_err(|e| format!("expected YYYY-MM-DDTHH:MM[:SS]: {}", e))
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
