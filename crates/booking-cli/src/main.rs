//! `pontedra` CLI — resolve bookable dates and slot lists from a calendar
//! snapshot, offline.
//!
//! ## Usage
//!
//! ```sh
//! # Which dates are bookable over the next 30 days?
//! pontedra dates -i calendar.json --today 2026-03-15
//!
//! # Provider self-service view: 90 days, weekends included
//! pontedra dates -i calendar.json --today 2026-03-15 --horizon 90 --allow-weekends
//!
//! # Slot list for one date (stdin works too)
//! pontedra slots -i calendar.json --date 2026-03-16 --now 2026-03-16T12:00:00Z
//!
//! # Machine-readable output
//! pontedra dates -i calendar.json --today 2026-03-15 --json
//! ```
//!
//! The snapshot format is the serde form of the provider's calendar:
//! `{ "rules": [...], "exceptions": [...], "appointments": [...] }`.

use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use chrono_tz::Tz;
use clap::{Parser, Subcommand};
use serde::Deserialize;
use std::io::{self, Read};

use booking_core::model::{
    Appointment, ExceptionRule, RecurringRule, ServiceWindow,
};
use booking_core::resolver::{resolve_dates, ResolverConfig, RuleMatch};
use booking_core::slots::generate_slots;

#[derive(Parser)]
#[command(
    name = "pontedra",
    version,
    about = "Pontedra booking availability inspector"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve the bookable-date horizon from a calendar snapshot
    Dates {
        /// Snapshot JSON file (reads from stdin if omitted)
        #[arg(short, long)]
        input: Option<String>,
        /// First day of the horizon, YYYY-MM-DD (provider-local)
        #[arg(long)]
        today: NaiveDate,
        /// Number of consecutive days to resolve
        #[arg(long, default_value_t = 30)]
        horizon: u32,
        /// Include Saturdays and Sundays (provider self-service view)
        #[arg(long)]
        allow_weekends: bool,
        /// Match rules by interval containment instead of the exact canonical window
        #[arg(long)]
        containment: bool,
        /// Provider timezone (IANA name)
        #[arg(long, default_value = "UTC")]
        tz: String,
        /// Emit JSON instead of the text listing
        #[arg(long)]
        json: bool,
    },
    /// Generate the slot list for a single date
    Slots {
        /// Snapshot JSON file (reads from stdin if omitted)
        #[arg(short, long)]
        input: Option<String>,
        /// The chosen date, YYYY-MM-DD (provider-local)
        #[arg(long)]
        date: NaiveDate,
        /// Slot length in minutes
        #[arg(long, default_value_t = 60)]
        interval: u32,
        /// Clock instant for the past-slot cutoff, RFC 3339 (defaults to now)
        #[arg(long)]
        now: Option<DateTime<Utc>>,
        /// Service window start, HH:MM:SS
        #[arg(long, default_value = "10:00:00")]
        window_start: NaiveTime,
        /// Service window end, HH:MM:SS
        #[arg(long, default_value = "16:00:00")]
        window_end: NaiveTime,
        /// Provider timezone (IANA name)
        #[arg(long, default_value = "UTC")]
        tz: String,
        /// Emit JSON instead of the text listing
        #[arg(long)]
        json: bool,
    },
}

/// The on-disk calendar snapshot. All sections are optional; an absent
/// section is an empty one.
#[derive(Debug, Deserialize, Default)]
struct Snapshot {
    #[serde(default)]
    rules: Vec<RecurringRule>,
    #[serde(default)]
    exceptions: Vec<ExceptionRule>,
    #[serde(default)]
    appointments: Vec<Appointment>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Dates {
            input,
            today,
            horizon,
            allow_weekends,
            containment,
            tz,
            json,
        } => {
            let snapshot = load_snapshot(input.as_deref())?;
            let tz = parse_tz(&tz)?;
            let config = ResolverConfig {
                horizon_days: horizon,
                allow_weekends,
                rule_match: if containment {
                    RuleMatch::Containment
                } else {
                    RuleMatch::ExactCanonical
                },
                window: ServiceWindow::canonical(),
            };

            let resolved = resolve_dates(
                today,
                &config,
                &snapshot.rules,
                &snapshot.exceptions,
                &snapshot.appointments,
                tz,
            );

            if json {
                println!("{}", serde_json::to_string_pretty(&resolved)?);
            } else {
                for row in &resolved {
                    let state = if row.is_bookable { "bookable" } else { "-" };
                    let marker = if row.has_existing_appointment {
                        "  [has appointment]"
                    } else {
                        ""
                    };
                    println!("{}  {}{}", row.date, state, marker);
                }
            }
        }
        Commands::Slots {
            input,
            date,
            interval,
            now,
            window_start,
            window_end,
            tz,
            json,
        } => {
            let snapshot = load_snapshot(input.as_deref())?;
            let tz = parse_tz(&tz)?;
            let now = now.unwrap_or_else(Utc::now);
            let window = ServiceWindow::new(window_start, window_end);

            let slots = generate_slots(
                date,
                window,
                interval,
                &snapshot.appointments,
                now,
                tz,
            )
            .context("Failed to generate slots")?;

            if json {
                println!("{}", serde_json::to_string_pretty(&slots)?);
            } else if slots.is_empty() {
                println!("no slots");
            } else {
                for slot in &slots {
                    let state = match (slot.is_booked, slot.is_past) {
                        (true, true) => "booked, past",
                        (true, false) => "booked",
                        (false, true) => "past",
                        (false, false) => "free",
                    };
                    println!(
                        "{}–{}  {}",
                        slot.start_time.format("%H:%M"),
                        slot.end_time.format("%H:%M"),
                        state
                    );
                }
            }
        }
    }

    Ok(())
}

fn parse_tz(name: &str) -> Result<Tz> {
    name.parse()
        .map_err(|_| anyhow::anyhow!("Invalid timezone: {}", name))
}

fn load_snapshot(path: Option<&str>) -> Result<Snapshot> {
    let raw = read_input(path)?;
    serde_json::from_str(&raw).context("Failed to parse calendar snapshot JSON")
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
