use std::fs;
use std::path::{Path, PathBuf};

use crate::system::process::ProcessSnapshot;
use crate::system::table::{DiscoveryError, ProcessTable};

const PROC_ROOT: &str = "/proc";

/// Reads `/proc/<pid>/stat` directly; counters are already in clock ticks.
pub struct ProcfsTable {
    root: PathBuf,
}

impl Default for ProcfsTable {
    fn default() -> Self {
        Self::new()
    }
}

impl ProcfsTable {
    pub fn new() -> Self {
        Self::with_root(PROC_ROOT)
    }

    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl ProcessTable for ProcfsTable {
    fn list(&self) -> Result<Vec<ProcessSnapshot>, DiscoveryError> {
        let entries = fs::read_dir(&self.root).map_err(|source| DiscoveryError::Unavailable {
            path: self.root.clone(),
            source,
        })?;

        let mut processes = Vec::new();
        for entry in entries.flatten() {
            let Some(pid) = entry.file_name().to_str().and_then(|s| s.parse::<u32>().ok()) else {
                continue;
            };
            if let Some(process) = self.read(pid) {
                processes.push(process);
            }
        }
        Ok(processes)
    }

    fn read(&self, pid: u32) -> Option<ProcessSnapshot> {
        let path = self.root.join(pid.to_string()).join("stat");
        let contents = fs::read_to_string(path).ok()?;
        parse_stat(&contents)
    }
}

/// Parses one `/proc/<pid>/stat` line.
fn parse_stat(contents: &str) -> Option<ProcessSnapshot> {
    // comm may contain spaces and parens, so split on the first '(' and
    // the last ')'
    let open = contents.find('(')?;
    let close = contents.rfind(')')?;
    if close < open {
        return None;
    }
    let pid = contents[..open].trim().parse().ok()?;
    let name = contents[open + 1..close].to_string();

    let fields: Vec<&str> = contents[close + 1..].split_whitespace().collect();
    // Fields after comm: state(0) ppid(1) pgrp(2) session(3) tty_nr(4)
    // tpgid(5) flags(6) minflt(7) cminflt(8) majflt(9) cmajflt(10)
    // utime(11) stime(12) cutime(13) cstime(14) priority(15) nice(16)
    // num_threads(17) itrealvalue(18) starttime(19)
    let ppid = fields.get(1)?.parse().ok()?;
    let user_ticks = fields.get(11)?.parse().ok()?;
    let system_ticks = fields.get(12)?.parse().ok()?;
    let start_ticks = fields.get(19).and_then(|s| s.parse().ok());

    Some(ProcessSnapshot {
        pid,
        ppid,
        name,
        user_ticks,
        system_ticks,
        start_ticks,
    })
}
