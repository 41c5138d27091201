use std::collections::HashSet;
use std::io;
use std::path::PathBuf;

use thiserror::Error;

use super::process::ProcessSnapshot;

/// Structural failure to enumerate the host's processes at all.
///
/// A single process vanishing mid-read is not a `DiscoveryError`; providers
/// report that as absence instead.
#[derive(Debug, Error)]
pub enum DiscoveryError {
    #[error("process table at {} is unreadable", .path.display())]
    Unavailable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("no process table provider for this host")]
    Unsupported,
}

/// Best-effort, point-in-time view of the host's processes.
pub trait ProcessTable {
    /// Every process currently visible. Entries that cannot be read are
    /// left out; only an unreadable table as a whole is an error.
    fn list(&self) -> Result<Vec<ProcessSnapshot>, DiscoveryError>;

    /// Fresh counters for one pid, or `None` if it no longer exists or
    /// cannot be read.
    fn read(&self, pid: u32) -> Option<ProcessSnapshot>;
}

impl<T: ProcessTable + ?Sized> ProcessTable for &T {
    fn list(&self) -> Result<Vec<ProcessSnapshot>, DiscoveryError> {
        (**self).list()
    }

    fn read(&self, pid: u32) -> Option<ProcessSnapshot> {
        (**self).read(pid)
    }
}

/// In-memory process table.
///
/// `vanished` pids still show up in `list()` but fail `read()`, which is
/// what a process exiting between enumeration and detail-read looks like.
#[derive(Clone, Debug, Default)]
pub struct MemoryTable {
    processes: Vec<ProcessSnapshot>,
    vanished: HashSet<u32>,
    unavailable: bool,
}

impl MemoryTable {
    pub fn new(processes: Vec<ProcessSnapshot>) -> Self {
        Self {
            processes,
            vanished: HashSet::new(),
            unavailable: false,
        }
    }

    /// A table whose `list()` always fails.
    pub fn unavailable() -> Self {
        Self {
            unavailable: true,
            ..Self::default()
        }
    }

    pub fn with_vanished(mut self, pids: impl IntoIterator<Item = u32>) -> Self {
        self.vanished.extend(pids);
        self
    }

    pub fn processes(&self) -> &[ProcessSnapshot] {
        &self.processes
    }

    pub fn insert(&mut self, process: ProcessSnapshot) {
        self.remove(process.pid);
        self.processes.push(process);
    }

    pub fn remove(&mut self, pid: u32) -> Option<ProcessSnapshot> {
        let idx = self.processes.iter().position(|p| p.pid == pid)?;
        Some(self.processes.remove(idx))
    }

    /// Adds ticks to a live process's counters.
    pub fn charge(&mut self, pid: u32, user_ticks: u64, system_ticks: u64) {
        if let Some(process) = self.processes.iter_mut().find(|p| p.pid == pid) {
            process.user_ticks += user_ticks;
            process.system_ticks += system_ticks;
        }
    }
}

impl ProcessTable for MemoryTable {
    fn list(&self) -> Result<Vec<ProcessSnapshot>, DiscoveryError> {
        if self.unavailable {
            return Err(DiscoveryError::Unavailable {
                path: PathBuf::from("memory"),
                source: io::Error::new(io::ErrorKind::PermissionDenied, "table marked unavailable"),
            });
        }
        Ok(self.processes.clone())
    }

    fn read(&self, pid: u32) -> Option<ProcessSnapshot> {
        if self.unavailable || self.vanished.contains(&pid) {
            return None;
        }
        self.processes.iter().find(|p| p.pid == pid).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn proc(pid: u32, ppid: u32) -> ProcessSnapshot {
        ProcessSnapshot {
            pid,
            ppid,
            name: format!("p{pid}"),
            user_ticks: 1,
            system_ticks: 1,
            start_ticks: None,
        }
    }

    #[test]
    fn vanished_pids_are_listed_but_unreadable() {
        let table = MemoryTable::new(vec![proc(1, 0), proc(2, 1)]).with_vanished([2]);
        assert_eq!(table.list().unwrap().len(), 2);
        assert!(table.read(1).is_some());
        assert!(table.read(2).is_none());
    }

    #[test]
    fn unavailable_table_fails_listing() {
        let table = MemoryTable::unavailable();
        assert!(matches!(
            table.list(),
            Err(DiscoveryError::Unavailable { .. })
        ));
        assert!(table.read(1).is_none());
    }

    #[test]
    fn charge_and_replace() {
        let mut table = MemoryTable::new(vec![proc(1, 0)]);
        table.charge(1, 10, 4);
        let p = table.read(1).unwrap();
        assert_eq!((p.user_ticks, p.system_ticks), (11, 5));

        table.insert(proc(1, 7));
        assert_eq!(table.processes().len(), 1);
        assert_eq!(table.read(1).unwrap().ppid, 7);
    }
}
