use std::fmt::Write;

use chrono::{DateTime, FixedOffset};
use serde::Serialize;

use crate::format::describe;
use crate::sampler::Sample;
use crate::system::diff::{ProcessDelta, Reconciliation};
use crate::system::lookup::CommandLine;
use crate::system::process::ProcessSnapshot;

pub fn header(pid: u32, target: Option<&CommandLine>) -> String {
    match target {
        Some(process) => format!("Monitoring pid {pid} \"{}\"", describe(process, "")),
        None => format!("Monitoring pid {pid}"),
    }
}

/// Event lines followed by the summary line, without a trailing newline.
pub fn render_text(sample: &Sample, verbose: bool) -> String {
    let diff = &sample.diff;
    let mut out = String::new();

    for delta in &diff.deltas {
        match delta.kind {
            Reconciliation::Continuing => {
                if verbose {
                    let _ = writeln!(
                        out,
                        "found {} ({}) +{} user, +{} sys ticks",
                        delta.pid, delta.name, delta.user_ticks, delta.system_ticks
                    );
                }
            }
            Reconciliation::Arrived => {
                let _ = writeln!(out, "new process appeared {} ({})", delta.pid, delta.name);
            }
            Reconciliation::Reused => {
                let _ = writeln!(out, "pid reused {} ({})", delta.pid, delta.name);
            }
        }
    }
    for process in &diff.departed {
        let _ = writeln!(out, "ended {} ({})", process.pid, process.name);
    }

    let _ = write!(
        out,
        "Total {:.3} sec ({:.3} %cpu) : {:.3} user, {:.3} sys ( {:.3} % user, {:.3} % sys ) @ {}",
        diff.total_seconds(),
        diff.cpu_percent(),
        diff.user_seconds(),
        diff.system_seconds(),
        diff.user_percent(),
        diff.system_percent(),
        sample.taken_at.to_rfc2822(),
    );
    out
}

#[derive(Serialize)]
struct JsonSample<'a> {
    round: u64,
    timestamp: &'a DateTime<FixedOffset>,
    interval_secs: f64,
    ticks_per_sec: u64,
    total_seconds: f64,
    cpu_percent: f64,
    user_seconds: f64,
    system_seconds: f64,
    user_percent: f64,
    system_percent: f64,
    arrived: Vec<&'a ProcessDelta>,
    reused: Vec<&'a ProcessDelta>,
    departed: &'a [ProcessSnapshot],
    #[serde(skip_serializing_if = "Option::is_none")]
    continuing: Option<Vec<&'a ProcessDelta>>,
}

/// One JSON object per sample, suitable for JSON-lines output.
pub fn render_json(sample: &Sample, verbose: bool) -> serde_json::Result<String> {
    let diff = &sample.diff;
    let record = JsonSample {
        round: sample.round,
        timestamp: &sample.taken_at,
        interval_secs: diff.interval.as_secs_f64(),
        ticks_per_sec: diff.ticks_per_sec,
        total_seconds: diff.total_seconds(),
        cpu_percent: diff.cpu_percent(),
        user_seconds: diff.user_seconds(),
        system_seconds: diff.system_seconds(),
        user_percent: diff.user_percent(),
        system_percent: diff.system_percent(),
        arrived: diff.arrived().collect(),
        reused: diff.reused().collect(),
        departed: &diff.departed,
        continuing: verbose.then(|| diff.continuing().collect()),
    };
    serde_json::to_string(&record)
}
