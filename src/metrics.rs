//! Operation counters for the tree.
//!
//! Counters are plain atomics updated with relaxed ordering; they are
//! observational and never affect cache semantics. Snapshots are taken
//! field by field, so a snapshot racing a burst of operations may mix
//! before/after values across fields.

use std::sync::atomic::{AtomicU64, Ordering};

/// Snapshot of tree-level operation metrics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TreeMetrics {
    /// Lookups issued through the root.
    pub gets: u64,
    /// Lookups that resolved to a node.
    pub hits: u64,
    /// Lookups that resolved to nothing.
    pub misses: u64,
    /// Successful writes through the root.
    pub sets: u64,
    /// Successful deletes through the root (absent keys included).
    pub deletes: u64,
    /// Entries removed by the expiry worker.
    pub expirations: u64,
}

/// Atomic counters backing [`TreeMetrics`].
#[derive(Debug, Default)]
pub(crate) struct OpCounters {
    gets: AtomicU64,
    hits: AtomicU64,
    misses: AtomicU64,
    sets: AtomicU64,
    deletes: AtomicU64,
    expirations: AtomicU64,
}

impl OpCounters {
    /// Snapshot current counter values.
    pub(crate) fn snapshot(&self) -> TreeMetrics {
        TreeMetrics {
            gets: self.gets.load(Ordering::Relaxed),
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            sets: self.sets.load(Ordering::Relaxed),
            deletes: self.deletes.load(Ordering::Relaxed),
            expirations: self.expirations.load(Ordering::Relaxed),
        }
    }

    pub(crate) fn inc_get(&self) {
        self.gets.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn inc_hit(&self) {
        self.hits.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn inc_miss(&self) {
        self.misses.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn inc_set(&self) {
        self.sets.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn inc_delete(&self) {
        self.deletes.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn inc_expiration(&self) {
        self.expirations.fetch_add(1, Ordering::Relaxed);
    }
}
