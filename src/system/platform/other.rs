use sysinfo::{Pid, Process, ProcessRefreshKind, ProcessesToUpdate, System};

use super::ms_to_ticks;
use crate::system::process::ProcessSnapshot;
use crate::system::table::{DiscoveryError, ProcessTable};

/// `sysinfo`-backed table for hosts without `/proc`.
///
/// sysinfo only exposes combined CPU time, so all of it is reported as
/// user ticks and system ticks stay zero.
pub struct SysinfoTable {
    ticks_per_sec: u64,
}

impl SysinfoTable {
    pub fn new(ticks_per_sec: u64) -> Self {
        Self { ticks_per_sec }
    }

    fn snapshot(&self, pid: Pid, process: &Process) -> ProcessSnapshot {
        ProcessSnapshot {
            pid: pid.as_u32(),
            ppid: process.parent().map(|p| p.as_u32()).unwrap_or(0),
            name: process.name().to_string_lossy().to_string(),
            user_ticks: ms_to_ticks(process.accumulated_cpu_time(), self.ticks_per_sec),
            system_ticks: 0,
            start_ticks: Some(process.start_time()),
        }
    }
}

fn refreshed(which: ProcessesToUpdate<'_>) -> System {
    let mut sys = System::new();
    sys.refresh_processes_specifics(which, true, ProcessRefreshKind::nothing().with_cpu());
    sys
}

impl ProcessTable for SysinfoTable {
    fn list(&self) -> Result<Vec<ProcessSnapshot>, DiscoveryError> {
        let sys = refreshed(ProcessesToUpdate::All);
        if sys.processes().is_empty() {
            return Err(DiscoveryError::Unsupported);
        }
        Ok(sys
            .processes()
            .iter()
            .map(|(pid, process)| self.snapshot(*pid, process))
            .collect())
    }

    fn read(&self, pid: u32) -> Option<ProcessSnapshot> {
        let pid = Pid::from_u32(pid);
        let pids = [pid];
        let sys = refreshed(ProcessesToUpdate::Some(&pids));
        sys.process(pid).map(|process| self.snapshot(pid, process))
    }
}
