//! Transaction counters
//!
//! The counters use Relaxed ordering: they are observational only and do not
//! synchronize any other memory. Approximate values under concurrency are
//! acceptable.

use std::sync::atomic::{AtomicU64, Ordering};

/// Live transaction counters owned by a root store
#[derive(Debug, Default)]
pub struct TxnMetrics {
    reads_started: AtomicU64,
    writes_started: AtomicU64,
    commits: AtomicU64,
    aborts: AtomicU64,
}

impl TxnMetrics {
    /// Create zeroed counters
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a read transaction start
    pub fn record_read(&self) {
        self.reads_started.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a write transaction start
    pub fn record_write(&self) {
        self.writes_started.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a write transaction commit
    pub fn record_commit(&self) {
        self.commits.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a write transaction abort
    pub fn record_abort(&self) {
        self.aborts.fetch_add(1, Ordering::Relaxed);
    }

    /// Point-in-time copy of the counters
    pub fn snapshot(&self) -> TxnStats {
        TxnStats {
            reads_started: self.reads_started.load(Ordering::Relaxed),
            writes_started: self.writes_started.load(Ordering::Relaxed),
            commits: self.commits.load(Ordering::Relaxed),
            aborts: self.aborts.load(Ordering::Relaxed),
        }
    }
}

/// Snapshot of transaction counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TxnStats {
    /// Read transactions begun
    pub reads_started: u64,
    /// Write transactions begun
    pub writes_started: u64,
    /// Write transactions committed
    pub commits: u64,
    /// Write transactions aborted (explicitly or by drop)
    pub aborts: u64,
}

impl TxnStats {
    /// Write transactions begun but not yet finished (0 or 1)
    pub fn active_writes(&self) -> u64 {
        self.writes_started
            .saturating_sub(self.commits)
            .saturating_sub(self.aborts)
    }
}
