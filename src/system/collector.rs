use sysinfo::{Pid, ProcessRefreshKind, ProcessesToUpdate, System, UpdateKind};

use super::lookup::CommandLine;

/// Command-line view of the host's processes, used to resolve a target by
/// name and to label it.
pub struct Collector {
    sys: System,
}

impl Default for Collector {
    fn default() -> Self {
        Self::new()
    }
}

impl Collector {
    pub fn new() -> Self {
        let mut sys = System::new();
        sys.refresh_processes_specifics(
            ProcessesToUpdate::All,
            true,
            ProcessRefreshKind::nothing().with_cmd(UpdateKind::Always),
        );
        Collector { sys }
    }

    pub fn command_lines(&self) -> Vec<CommandLine> {
        let mut lines: Vec<CommandLine> = self
            .sys
            .processes()
            .iter()
            .map(|(pid, process)| to_command_line(*pid, process))
            .collect();
        lines.sort_by_key(|l| l.pid);
        lines
    }

    pub fn command_line(&self, pid: u32) -> Option<CommandLine> {
        let pid = Pid::from_u32(pid);
        self.sys
            .process(pid)
            .map(|process| to_command_line(pid, process))
    }
}

fn to_command_line(pid: Pid, process: &sysinfo::Process) -> CommandLine {
    CommandLine {
        pid: pid.as_u32(),
        name: process.name().to_string_lossy().to_string(),
        args: process
            .cmd()
            .iter()
            .map(|s| s.to_string_lossy().to_string())
            .collect(),
    }
}
