//! Host-specific `ProcessTable` providers.

#[cfg(target_os = "linux")]
mod linux;
#[cfg(not(target_os = "linux"))]
mod other;

#[cfg(target_os = "linux")]
pub use linux::ProcfsTable as HostTable;
#[cfg(not(target_os = "linux"))]
pub use other::SysinfoTable as HostTable;

/// The process table of the running host.
///
/// `ticks_per_sec` is only consulted by providers that report CPU time in
/// wall units and must convert to ticks; `/proc` already counts in ticks.
pub fn host_table(ticks_per_sec: u64) -> HostTable {
    #[cfg(target_os = "linux")]
    {
        let _ = ticks_per_sec;
        linux::ProcfsTable::new()
    }
    #[cfg(not(target_os = "linux"))]
    {
        other::SysinfoTable::new(ticks_per_sec)
    }
}

/// CPU milliseconds to clock ticks, saturating at `u64::MAX`.
#[cfg_attr(target_os = "linux", allow(dead_code))]
fn ms_to_ticks(ms: u64, ticks_per_sec: u64) -> u64 {
    let ticks = u128::from(ms) * u128::from(ticks_per_sec) / 1000;
    u64::try_from(ticks).unwrap_or(u64::MAX)
}
