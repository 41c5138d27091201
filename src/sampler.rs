use std::time::Duration;

use chrono::{DateTime, FixedOffset, Local};
use thiserror::Error;
use tracing::{debug, info, info_span};

use crate::system::diff::{DiffResult, SnapshotDiffer};
use crate::system::discover::TreeDiscoverer;
use crate::system::table::{DiscoveryError, ProcessTable};

#[derive(Debug, Error)]
pub enum SampleError {
    #[error("process {0} does not exist")]
    RootNotFound(u32),

    #[error("process {0} has exited")]
    RootExited(u32),

    #[error(transparent)]
    Discovery(#[from] DiscoveryError),
}

/// One finished interval.
#[derive(Clone, Debug)]
pub struct Sample {
    pub round: u64,
    pub taken_at: DateTime<FixedOffset>,
    pub diff: DiffResult,
}

/// Discover, sleep, discover again, diff. Strictly sequential; nothing is
/// carried from one round to the next.
pub struct Sampler<T> {
    discoverer: TreeDiscoverer<T>,
    differ: SnapshotDiffer,
    root: u32,
    interval: Duration,
}

impl<T: ProcessTable> Sampler<T> {
    /// Fails with `Discovery` if the process table is unreadable, and with
    /// `RootNotFound` if `root` cannot be read right now.
    pub fn new(
        table: T,
        root: u32,
        interval: Duration,
        differ: SnapshotDiffer,
    ) -> Result<Self, SampleError> {
        table.list()?;
        if table.read(root).is_none() {
            return Err(SampleError::RootNotFound(root));
        }
        Ok(Self {
            discoverer: TreeDiscoverer::new(table),
            differ,
            root,
            interval,
        })
    }

    pub fn root(&self) -> u32 {
        self.root
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Runs one interval. Blocks the calling thread for the full interval.
    pub fn sample_once(&self, round: u64) -> Result<Sample, SampleError> {
        let _span = info_span!("sample", root = self.root, round).entered();

        let earlier = self.discoverer.discover(self.root)?;
        if !earlier.contains_root() {
            return Err(SampleError::RootExited(self.root));
        }
        debug!(processes = earlier.len(), "first snapshot taken");

        std::thread::sleep(self.interval);

        let later = self.discoverer.discover(self.root)?;
        debug!(processes = later.len(), "second snapshot taken");

        let diff = self.differ.diff(&earlier, &later, self.interval);
        Ok(Sample {
            round,
            taken_at: Local::now().fixed_offset(),
            diff,
        })
    }

    /// Samples `count` intervals (forever when `count == 0`), handing each
    /// to `on_sample`. Returns the number of completed rounds.
    pub fn run<F, E>(&self, count: u64, mut on_sample: F) -> Result<u64, E>
    where
        F: FnMut(Sample) -> Result<(), E>,
        E: From<SampleError>,
    {
        info!(
            root = self.root,
            interval_secs = self.interval.as_secs_f64(),
            count,
            "sampling started"
        );
        let mut round = 0;
        while count == 0 || round < count {
            let sample = self.sample_once(round)?;
            on_sample(sample)?;
            round += 1;
        }
        Ok(round)
    }
}
