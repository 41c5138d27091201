use std::cell::Cell;
use std::time::Duration;

use chrono::{FixedOffset, TimeZone};
use insta::assert_snapshot;
use treecpu::report::render_text;
use treecpu::sampler::{Sample, SampleError, Sampler};
use treecpu::system::{
    DiscoveryError, ProcessSnapshot, ProcessTable, Reconciliation, SnapshotDiffer, TreeDiscoverer,
};

fn process(pid: u32, ppid: u32, name: &str, user: u64, system: u64, start: u64) -> ProcessSnapshot {
    ProcessSnapshot {
        pid,
        ppid,
        name: name.to_string(),
        user_ticks: user,
        system_ticks: system,
        start_ticks: Some(start),
    }
}

/// Serves one host state per `list()` call, holding on the last one.
struct ScriptedTable {
    phases: Vec<Vec<ProcessSnapshot>>,
    listed: Cell<usize>,
}

impl ScriptedTable {
    fn new(phases: Vec<Vec<ProcessSnapshot>>) -> Self {
        Self {
            phases,
            listed: Cell::new(0),
        }
    }

    /// `Sampler::new` lists the table once before the first round, so the
    /// first host state is served twice.
    fn for_sampler(mut phases: Vec<Vec<ProcessSnapshot>>) -> Self {
        phases.insert(0, phases[0].clone());
        Self::new(phases)
    }

    fn current(&self) -> &[ProcessSnapshot] {
        let idx = self.listed.get().saturating_sub(1).min(self.phases.len() - 1);
        &self.phases[idx]
    }
}

impl ProcessTable for ScriptedTable {
    fn list(&self) -> Result<Vec<ProcessSnapshot>, DiscoveryError> {
        self.listed.set(self.listed.get() + 1);
        Ok(self.current().to_vec())
    }

    fn read(&self, pid: u32) -> Option<ProcessSnapshot> {
        self.current().iter().find(|p| p.pid == pid).cloned()
    }
}

/// make(1) runs cc1(2) which runs as(3); `sh` holds pid 9 under make.
/// Between snapshots `as` exits, `ld` (4) starts under cc1 and pid 9 is
/// handed to a brand new `sh`.
fn churn() -> Vec<Vec<ProcessSnapshot>> {
    vec![
        vec![
            process(50, 0, "sshd", 9000, 9000, 1),
            process(1, 0, "make", 100, 50, 10),
            process(2, 1, "cc1", 40, 10, 20),
            process(3, 2, "as", 5, 5, 30),
            process(9, 1, "sh", 500, 200, 40),
        ],
        vec![
            process(9, 1, "sh", 2, 1, 70),
            process(4, 2, "ld", 7, 3, 60),
            process(2, 1, "cc1", 60, 10, 20),
            process(1, 0, "make", 150, 80, 10),
            process(50, 0, "sshd", 9100, 9100, 1),
        ],
    ]
}

#[test]
fn sampler_classifies_churn() {
    let table = ScriptedTable::for_sampler(churn());
    let sampler = Sampler::new(table, 1, Duration::ZERO, SnapshotDiffer::new(100)).unwrap();
    let sample = sampler.sample_once(0).unwrap();
    let diff = &sample.diff;

    let pids = |kind: Reconciliation| -> Vec<u32> {
        diff.deltas
            .iter()
            .filter(|d| d.kind == kind)
            .map(|d| d.pid)
            .collect()
    };
    assert_eq!(pids(Reconciliation::Continuing), vec![1, 2]);
    assert_eq!(pids(Reconciliation::Arrived), vec![4]);
    assert_eq!(pids(Reconciliation::Reused), vec![9]);
    assert_eq!(
        diff.departed.iter().map(|p| p.pid).collect::<Vec<_>>(),
        vec![3]
    );

    // sshd is outside the tree and never counted.
    assert_eq!(diff.user_ticks, 50 + 20 + 7 + 2);
    assert_eq!(diff.system_ticks, 30 + 3 + 1);
}

#[test]
fn root_exit_stops_the_next_round() {
    let mut phases = churn();
    phases.push(vec![process(50, 0, "sshd", 9200, 9200, 1)]);
    let table = ScriptedTable::for_sampler(phases);
    let sampler = Sampler::new(table, 1, Duration::ZERO, SnapshotDiffer::new(100)).unwrap();

    let mut completed = 0;
    let result = sampler.run(0, |_| {
        completed += 1;
        Ok::<(), SampleError>(())
    });
    assert!(matches!(result, Err(SampleError::RootExited(1))));
    assert_eq!(completed, 1);
}

#[test]
fn root_gone_from_later_snapshot_is_reported_then_stops() {
    let table = ScriptedTable::for_sampler(vec![
        vec![
            process(1, 0, "make", 100, 50, 10),
            process(2, 1, "cc1", 40, 10, 20),
        ],
        vec![process(2, 1, "cc1", 45, 10, 20)],
    ]);
    let sampler = Sampler::new(table, 1, Duration::ZERO, SnapshotDiffer::new(100)).unwrap();

    let mut reported = Vec::new();
    let result = sampler.run(0, |sample| {
        reported.push(sample);
        Ok::<(), SampleError>(())
    });

    assert!(matches!(result, Err(SampleError::RootExited(1))));
    assert_eq!(reported.len(), 1);
    let departed: Vec<u32> = reported[0].diff.departed.iter().map(|p| p.pid).collect();
    assert!(departed.contains(&1), "root missing from departed: {departed:?}");
    assert_eq!(reported[0].diff.total_ticks(), 0);
}

#[test]
fn churn_report_snapshot() {
    let table = ScriptedTable::new(churn());
    let discoverer = TreeDiscoverer::new(table);
    let earlier = discoverer.discover(1).unwrap();
    let later = discoverer.discover(1).unwrap();

    let sample = Sample {
        round: 0,
        taken_at: FixedOffset::east_opt(0)
            .unwrap()
            .with_ymd_and_hms(2026, 10, 15, 12, 0, 0)
            .unwrap(),
        diff: SnapshotDiffer::new(100).diff(&earlier, &later, Duration::from_secs(10)),
    };
    let rendered = render_text(&sample, true);

    assert_snapshot!("churn_report_verbose", rendered);
}
