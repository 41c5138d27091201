use std::collections::HashMap;

use serde::Serialize;

/// One process's CPU accounting at a sampling instant.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ProcessSnapshot {
    pub pid: u32,
    pub ppid: u32,
    pub name: String,
    /// Cumulative user-mode CPU ticks since process start.
    pub user_ticks: u64,
    /// Cumulative kernel-mode CPU ticks since process start.
    pub system_ticks: u64,
    /// Start time in ticks since boot, when the host exposes it.
    pub start_ticks: Option<u64>,
}

impl ProcessSnapshot {
    pub fn total_ticks(&self) -> u64 {
        self.user_ticks + self.system_ticks
    }

    /// Whether `other` plausibly is the same process as `self`, judged by
    /// parent id and, when both sides know it, start time.
    pub fn same_identity(&self, other: &ProcessSnapshot) -> bool {
        if self.ppid != other.ppid {
            return false;
        }
        match (self.start_ticks, other.start_ticks) {
            (Some(a), Some(b)) => a == b,
            _ => true,
        }
    }
}

/// The root process and every descendant reachable by parent-id links at
/// one instant, keyed by pid.
#[derive(Clone, Debug, Default)]
pub struct TreeSnapshot {
    pub root: u32,
    pub processes: HashMap<u32, ProcessSnapshot>,
}

impl TreeSnapshot {
    pub fn new(root: u32) -> Self {
        Self {
            root,
            processes: HashMap::new(),
        }
    }

    pub fn from_processes(root: u32, processes: impl IntoIterator<Item = ProcessSnapshot>) -> Self {
        Self {
            root,
            processes: processes.into_iter().map(|p| (p.pid, p)).collect(),
        }
    }

    pub fn get(&self, pid: u32) -> Option<&ProcessSnapshot> {
        self.processes.get(&pid)
    }

    pub fn contains(&self, pid: u32) -> bool {
        self.processes.contains_key(&pid)
    }

    pub fn contains_root(&self) -> bool {
        self.contains(self.root)
    }

    pub fn len(&self) -> usize {
        self.processes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.processes.is_empty()
    }

    /// Pids in ascending order.
    pub fn pids(&self) -> Vec<u32> {
        let mut pids: Vec<u32> = self.processes.keys().copied().collect();
        pids.sort_unstable();
        pids
    }
}
