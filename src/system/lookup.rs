/// A process as seen by name lookup: command name plus argv.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CommandLine {
    pub pid: u32,
    pub name: String,
    pub args: Vec<String>,
}

impl CommandLine {
    pub fn joined(&self) -> String {
        self.args.join(" ")
    }

    pub fn matches(&self, key: &str) -> bool {
        self.name.contains(key) || self.args.iter().any(|arg| arg.contains(key))
    }
}

/// Every process whose command name or any argument contains `key`,
/// ordered by pid. `exclude_pid` (normally our own pid) never matches,
/// since our own argv always contains the key.
pub fn match_candidates(
    processes: &[CommandLine],
    key: &str,
    exclude_pid: u32,
) -> Vec<CommandLine> {
    let mut matches: Vec<CommandLine> = processes
        .iter()
        .filter(|p| p.pid != exclude_pid && p.matches(key))
        .cloned()
        .collect();
    matches.sort_by_key(|p| p.pid);
    matches
}
