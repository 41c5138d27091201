use std::collections::{HashSet, VecDeque};

use tracing::{debug, debug_span};

use super::process::TreeSnapshot;
use super::table::{DiscoveryError, ProcessTable};

/// Finds a root process and all of its descendants.
pub struct TreeDiscoverer<T> {
    table: T,
}

impl<T: ProcessTable> TreeDiscoverer<T> {
    pub fn new(table: T) -> Self {
        Self { table }
    }

    pub fn table(&self) -> &T {
        &self.table
    }

    /// Breadth-first walk over parent-id links starting at `root`.
    ///
    /// The host is enumerated once; every popped pid then gets a linear scan
    /// of that listing for its children (no parent->children index) and a
    /// fresh detail-read for its counters. A pid that cannot be read, or
    /// whose fresh read names a different parent than the listing did, is
    /// skipped along with its subtree. Only an unreadable process table
    /// fails the call, so a root that is already gone yields an empty
    /// snapshot.
    pub fn discover(&self, root: u32) -> Result<TreeSnapshot, DiscoveryError> {
        let _span = debug_span!("discover", root).entered();

        let listing = self.table.list()?;
        let mut tree = TreeSnapshot::new(root);
        let mut queued = HashSet::from([root]);
        let mut pending = VecDeque::from([(root, None)]);
        let mut skipped = 0usize;

        while let Some((pid, parent)) = pending.pop_front() {
            let Some(process) = self.table.read(pid) else {
                debug!(pid, "process vanished before its counters were read");
                skipped += 1;
                continue;
            };
            if let Some(parent) = parent
                && process.ppid != parent
            {
                debug!(pid, parent, ppid = process.ppid, "pid changed hands after listing");
                skipped += 1;
                continue;
            }
            tree.processes.insert(pid, process);

            for child in listing.iter().filter(|p| p.ppid == pid && p.pid != pid) {
                if !tree.contains(child.pid) && queued.insert(child.pid) {
                    pending.push_back((child.pid, Some(pid)));
                }
            }
        }

        debug!(found = tree.len(), skipped, "discovery complete");
        Ok(tree)
    }
}
