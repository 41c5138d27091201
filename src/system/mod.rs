pub mod collector;
pub mod diff;
pub mod discover;
pub mod lookup;
pub mod platform;
pub mod process;
pub mod table;

pub use diff::{DiffResult, ProcessDelta, Reconciliation, SnapshotDiffer};
pub use discover::TreeDiscoverer;
pub use process::{ProcessSnapshot, TreeSnapshot};
pub use table::{DiscoveryError, MemoryTable, ProcessTable};
