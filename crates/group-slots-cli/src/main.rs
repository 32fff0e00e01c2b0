//! `group-slots` CLI — find when a group can meet, from a calendar snapshot.
//!
//! ## Usage
//!
//! ```sh
//! # Available hourly slots for a group between two timestamps
//! group-slots find --data calendar.json --group team --as alice \
//!   --start 2026-03-16T09:00:00Z --end 2026-03-16T18:00:00Z
//!
//! # 30-minute slots, ignoring back-to-back busy intervals
//! group-slots find --data calendar.json --group team --as alice \
//!   --start 2026-03-16T09:00:00Z --end 2026-03-16T18:00:00Z \
//!   --duration 30 --overlap half-open
//!
//! # One working day with conflicts, in the group's local timezone
//! group-slots day --data calendar.json --group team --as alice \
//!   --date 2026-03-16 --timezone Europe/Amsterdam
//! ```
//!
//! Working hours, default duration, timezone and overlap rule come from
//! `--config <file.toml>` or `~/.config/group-slots/config.toml`; flags win.

mod config;

use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, Utc};
use clap::{Parser, Subcommand};
use group_slots::{
    CalendarSnapshot, CandidateSlot, InMemoryCalendar, OverlapRule, SlotFinder, SlotRequest,
    WorkingHours,
};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "group-slots",
    version,
    about = "Find meeting slots where every group member is free"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Scheduling config file (TOML)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log to stderr (-v debug, -vv trace); RUST_LOG takes precedence
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// List available slots in a date range
    Find {
        /// Calendar snapshot (JSON)
        #[arg(long)]
        data: PathBuf,
        /// Group to search
        #[arg(long)]
        group: String,
        /// User making the request (must be a group member)
        #[arg(long = "as", value_name = "USER")]
        caller: String,
        /// Range start (RFC 3339, or naive time as UTC)
        #[arg(long)]
        start: String,
        /// Range end (RFC 3339, or naive time as UTC)
        #[arg(long)]
        end: String,
        /// Slot length in minutes
        #[arg(long, allow_negative_numbers = true)]
        duration: Option<i64>,
        /// Overlap rule: inclusive or half-open
        #[arg(long)]
        overlap: Option<OverlapRule>,
    },
    /// Show every slot of one working day, with conflicts
    Day {
        /// Calendar snapshot (JSON)
        #[arg(long)]
        data: PathBuf,
        /// Group to search
        #[arg(long)]
        group: String,
        /// User making the request (must be a group member)
        #[arg(long = "as", value_name = "USER")]
        caller: String,
        /// Day to show (YYYY-MM-DD)
        #[arg(long)]
        date: NaiveDate,
        /// First hour of the working day
        #[arg(long)]
        start_hour: Option<u32>,
        /// Hour the working day ends
        #[arg(long)]
        end_hour: Option<u32>,
        /// Slot length in minutes
        #[arg(long, allow_negative_numbers = true)]
        duration: Option<i64>,
        /// IANA timezone of the working hours
        #[arg(long)]
        timezone: Option<String>,
        /// Overlap rule: inclusive or half-open
        #[arg(long)]
        overlap: Option<OverlapRule>,
    },
}

/// A slot as printed by `day`.
#[derive(Serialize)]
struct SlotDto {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    available: bool,
    conflicts: Vec<String>,
}

impl From<&CandidateSlot> for SlotDto {
    fn from(slot: &CandidateSlot) -> Self {
        Self {
            start: slot.interval.start,
            end: slot.interval.end,
            available: slot.available,
            conflicts: slot.conflicts.iter().map(|c| c.to_string()).collect(),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let mut settings = config::load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Find {
            data,
            group,
            caller,
            start,
            end,
            duration,
            overlap,
        } => {
            let store = load_snapshot(&data)?;
            let rule = overlap.unwrap_or(settings.overlap_rule);
            let duration =
                duration.unwrap_or(i64::from(settings.default_duration_minutes));

            let request = SlotRequest::parse(&group, &start, &end, Some(duration))
                .context("Invalid slot request")?;
            let finder = SlotFinder::new(store.clone(), store).with_overlap_rule(rule);
            let slots = finder
                .find_available_slots(&caller, &request)
                .await
                .with_context(|| format!("Failed to find slots for group '{}'", group))?;

            println!("{}", serde_json::to_string_pretty(&slots)?);
        }
        Commands::Day {
            data,
            group,
            caller,
            date,
            start_hour,
            end_hour,
            duration,
            timezone,
            overlap,
        } => {
            if let Some(tz) = timezone {
                settings.timezone = tz;
            }
            let tz = settings.tz()?;
            let hours = WorkingHours {
                start_hour: start_hour.unwrap_or(settings.working_hours.start_hour),
                end_hour: end_hour.unwrap_or(settings.working_hours.end_hour),
            };
            let rule = overlap.unwrap_or(settings.overlap_rule);
            let duration =
                duration.unwrap_or(i64::from(settings.default_duration_minutes));

            let store = load_snapshot(&data)?;
            let finder = SlotFinder::new(store.clone(), store).with_overlap_rule(rule);
            let slots = finder
                .evaluate_day(&caller, &group, date, hours, duration, tz)
                .await
                .with_context(|| format!("Failed to evaluate {} for group '{}'", date, group))?;

            let out: Vec<SlotDto> = slots.iter().map(SlotDto::from).collect();
            println!("{}", serde_json::to_string_pretty(&out)?);
        }
    }

    Ok(())
}

fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_snapshot(path: &Path) -> Result<Arc<InMemoryCalendar>> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read file: {}", path.display()))?;
    let snapshot: CalendarSnapshot = serde_json::from_str(&contents)
        .with_context(|| format!("Failed to parse calendar snapshot: {}", path.display()))?;
    let store = InMemoryCalendar::from_snapshot(snapshot)
        .with_context(|| format!("Invalid calendar snapshot: {}", path.display()))?;
    Ok(Arc::new(store))
}
