use std::time::Duration;

use serde::Serialize;
use tracing::{debug, debug_span, warn};

use super::process::{ProcessSnapshot, TreeSnapshot};

/// Clock ticks per second on most Linux hosts (`USER_HZ`).
pub const DEFAULT_TICKS_PER_SEC: u64 = 100;

/// How a pid in the later snapshot was matched against the earlier one.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Reconciliation {
    /// Same process in both snapshots; counts the counter difference.
    Continuing,
    /// Only in the later snapshot; counts its whole lifetime.
    Arrived,
    /// Pid present in both but held by a different process (parent or
    /// start time changed, or a counter went backwards); counts the later
    /// process's whole lifetime.
    Reused,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ProcessDelta {
    pub pid: u32,
    pub ppid: u32,
    pub name: String,
    pub user_ticks: u64,
    pub system_ticks: u64,
    pub kind: Reconciliation,
}

/// Aggregate CPU use of a process tree over one interval.
#[derive(Clone, Debug)]
pub struct DiffResult {
    pub user_ticks: u64,
    pub system_ticks: u64,
    /// Continuing, arrived and reused processes, sorted by pid.
    pub deltas: Vec<ProcessDelta>,
    /// Processes only in the earlier snapshot, sorted by pid.
    pub departed: Vec<ProcessSnapshot>,
    pub interval: Duration,
    pub ticks_per_sec: u64,
}

impl DiffResult {
    pub fn total_ticks(&self) -> u64 {
        self.user_ticks + self.system_ticks
    }

    pub fn user_seconds(&self) -> f64 {
        self.ticks_to_seconds(self.user_ticks)
    }

    pub fn system_seconds(&self) -> f64 {
        self.ticks_to_seconds(self.system_ticks)
    }

    pub fn total_seconds(&self) -> f64 {
        self.ticks_to_seconds(self.total_ticks())
    }

    pub fn cpu_percent(&self) -> f64 {
        self.percent_of_interval(self.total_seconds())
    }

    pub fn user_percent(&self) -> f64 {
        self.percent_of_interval(self.user_seconds())
    }

    pub fn system_percent(&self) -> f64 {
        self.percent_of_interval(self.system_seconds())
    }

    pub fn continuing(&self) -> impl Iterator<Item = &ProcessDelta> {
        self.of_kind(Reconciliation::Continuing)
    }

    pub fn arrived(&self) -> impl Iterator<Item = &ProcessDelta> {
        self.of_kind(Reconciliation::Arrived)
    }

    pub fn reused(&self) -> impl Iterator<Item = &ProcessDelta> {
        self.of_kind(Reconciliation::Reused)
    }

    fn of_kind(&self, kind: Reconciliation) -> impl Iterator<Item = &ProcessDelta> {
        self.deltas.iter().filter(move |d| d.kind == kind)
    }

    fn ticks_to_seconds(&self, ticks: u64) -> f64 {
        if self.ticks_per_sec == 0 {
            return 0.0;
        }
        ticks as f64 / self.ticks_per_sec as f64
    }

    fn percent_of_interval(&self, seconds: f64) -> f64 {
        let interval = self.interval.as_secs_f64();
        if interval <= 0.0 {
            return 0.0;
        }
        100.0 * seconds / interval
    }
}

/// Reconciles two snapshots of the same tree.
#[derive(Clone, Copy, Debug)]
pub struct SnapshotDiffer {
    ticks_per_sec: u64,
}

impl Default for SnapshotDiffer {
    fn default() -> Self {
        Self::new(DEFAULT_TICKS_PER_SEC)
    }
}

impl SnapshotDiffer {
    pub fn new(ticks_per_sec: u64) -> Self {
        Self { ticks_per_sec }
    }

    pub fn ticks_per_sec(&self) -> u64 {
        self.ticks_per_sec
    }

    pub fn diff(
        &self,
        earlier: &TreeSnapshot,
        later: &TreeSnapshot,
        interval: Duration,
    ) -> DiffResult {
        let _span = debug_span!("diff", root = later.root).entered();

        let mut deltas = Vec::with_capacity(later.len());
        for pid in later.pids() {
            let Some(now) = later.get(pid) else {
                continue;
            };
            let delta = match earlier.get(pid) {
                Some(before) => reconcile(before, now),
                None => {
                    debug!(pid, name = %now.name, "process arrived");
                    lifetime(now, Reconciliation::Arrived)
                }
            };
            deltas.push(delta);
        }

        let departed: Vec<ProcessSnapshot> = earlier
            .pids()
            .into_iter()
            .filter(|pid| !later.contains(*pid))
            .filter_map(|pid| earlier.get(pid).cloned())
            .collect();

        let user_ticks: u64 = deltas.iter().map(|d| d.user_ticks).sum();
        let system_ticks: u64 = deltas.iter().map(|d| d.system_ticks).sum();
        debug!(
            user_ticks,
            system_ticks,
            departed = departed.len(),
            "diff complete"
        );

        DiffResult {
            user_ticks,
            system_ticks,
            deltas,
            departed,
            interval,
            ticks_per_sec: self.ticks_per_sec,
        }
    }
}

fn reconcile(before: &ProcessSnapshot, now: &ProcessSnapshot) -> ProcessDelta {
    let user = now.user_ticks.checked_sub(before.user_ticks);
    let system = now.system_ticks.checked_sub(before.system_ticks);

    match (user, system) {
        (Some(user_ticks), Some(system_ticks)) if before.same_identity(now) => ProcessDelta {
            pid: now.pid,
            ppid: now.ppid,
            name: now.name.clone(),
            user_ticks,
            system_ticks,
            kind: Reconciliation::Continuing,
        },
        _ => {
            warn!(
                pid = now.pid,
                before = %before.name,
                after = %now.name,
                "pid reused between snapshots; counting the new holder's full lifetime"
            );
            lifetime(now, Reconciliation::Reused)
        }
    }
}

fn lifetime(now: &ProcessSnapshot, kind: Reconciliation) -> ProcessDelta {
    ProcessDelta {
        pid: now.pid,
        ppid: now.ppid,
        name: now.name.clone(),
        user_ticks: now.user_ticks,
        system_ticks: now.system_ticks,
        kind,
    }
}
