//! Aggregate CPU time of a process and all of its descendants, sampled by
//! diffing two snapshots of the process tree.

pub mod config;
pub mod format;
pub mod logging;
pub mod report;
pub mod sampler;
pub mod system;
