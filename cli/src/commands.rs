//! Subcommands and their JSON rendering.

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::Context;
use clap::Subcommand;
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::{debug, info};
use vesting_engine::{
    compute_schedule, count_releases, get_duration, ComputedSchedule, ReleaseFrequency,
    ScheduleConfiguration, Timestamp, UnlockEvent,
};

use crate::config::Output;

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Compute cliff, releases, projected end and chart series from a schedule file.
    Compute {
        /// JSON schedule record (camelCase fields).
        schedule: PathBuf,
    },
    /// Human-readable length of an interval.
    Duration { start: Timestamp, end: Timestamp },
    /// Number of releases between two instants.
    Count {
        /// e.g. monthly, every-2-weeks
        frequency: ReleaseFrequency,
        from: Timestamp,
        to: Timestamp,
    },
    /// Vested and claimable amounts of a schedule at an instant.
    Vested {
        schedule: PathBuf,
        #[arg(long)]
        at: Timestamp,
        /// Amount already claimed by the recipient.
        #[arg(long, default_value = "0")]
        claimed: Decimal,
    },
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct DurationReport {
    duration: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CountReport {
    frequency: ReleaseFrequency,
    interval_seconds: u64,
    number_of_releases: u64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct VestedReport {
    at: Timestamp,
    vested: Decimal,
    claimable: Decimal,
    progress: Decimal,
    next_unlock: Option<UnlockEvent>,
}

/// Read a schedule record from a JSON file.
pub fn load_schedule(path: &Path) -> anyhow::Result<ScheduleConfiguration> {
    let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
    serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("parsing schedule {}", path.display()))
}

fn compute_logged(path: &Path) -> anyhow::Result<ComputedSchedule> {
    let config = load_schedule(path)?;
    info!(schedule = %path.display(), frequency = %config.release_frequency, "computing schedule");

    let started = Instant::now();
    let schedule = compute_schedule(&config)
        .with_context(|| format!("invalid schedule {}", path.display()))?;
    debug!(
        releases = schedule.number_of_releases,
        interpolation = ?schedule.series.interpolation,
        elapsed_us = started.elapsed().as_micros() as u64,
        "schedule computed"
    );

    if schedule.projected_end_date_time != config.end_date_time {
        info!(
            nominal = %config.end_date_time,
            projected = %schedule.projected_end_date_time,
            "end date aligned to release interval"
        );
    }
    Ok(schedule)
}

/// Execute `cmd` and return the text to print.
pub fn run(cmd: &Command, output: &Output) -> anyhow::Result<String> {
    let value = match cmd {
        Command::Compute { schedule } => {
            let computed = compute_logged(schedule)?;
            let mut value = serde_json::to_value(&computed)?;
            if !output.include_series {
                if let Some(obj) = value.as_object_mut() {
                    obj.remove("series");
                }
            }
            value
        }
        Command::Duration { start, end } => serde_json::to_value(DurationReport {
            duration: get_duration(*start, *end),
        })?,
        Command::Count { frequency, from, to } => {
            let number_of_releases = count_releases(*frequency, *from, *to)
                .context("counting releases")?;
            serde_json::to_value(CountReport {
                frequency: *frequency,
                interval_seconds: frequency.interval_seconds(),
                number_of_releases,
            })?
        }
        Command::Vested { schedule, at, claimed } => {
            let computed = compute_logged(schedule)?;
            serde_json::to_value(VestedReport {
                at: *at,
                vested: computed.vested_at(*at),
                claimable: computed.claimable_at(*at, *claimed),
                progress: computed.progress_at(*at),
                next_unlock: computed.next_unlock_after(*at),
            })?
        }
    };

    let text = if output.pretty {
        serde_json::to_string_pretty(&value)?
    } else {
        serde_json::to_string(&value)?
    };
    Ok(text)
}
