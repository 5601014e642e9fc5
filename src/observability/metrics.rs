//! Metrics registry
//!
//! - Counters only
//! - Monotonic increase
//! - Thread-safe, relaxed ordering

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

/// Operational counters for one store
#[derive(Debug, Default)]
pub struct MetricsRegistry {
    ids_generated: AtomicU64,
    documents_created: AtomicU64,
    documents_updated: AtomicU64,
    documents_deleted: AtomicU64,
    queries: AtomicU64,
    locks_acquired: AtomicU64,
    lock_conflicts: AtomicU64,
    locks_removed: AtomicU64,
    lock_removal_mismatches: AtomicU64,
    binary_scans: AtomicU64,
    binaries_marked: AtomicU64,
}

impl MetricsRegistry {
    /// Create a new metrics registry with all counters at zero
    pub fn new() -> Self {
        Self::default()
    }

    pub fn increment_ids_generated(&self) {
        self.ids_generated.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_documents_created(&self) {
        self.documents_created.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_documents_updated(&self) {
        self.documents_updated.fetch_add(1, Ordering::Relaxed);
    }

    pub fn add_documents_deleted(&self, count: u64) {
        self.documents_deleted.fetch_add(count, Ordering::Relaxed);
    }

    pub fn increment_queries(&self) {
        self.queries.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_locks_acquired(&self) {
        self.locks_acquired.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_lock_conflicts(&self) {
        self.lock_conflicts.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_locks_removed(&self) {
        self.locks_removed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_lock_removal_mismatches(&self) {
        self.lock_removal_mismatches.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_binary_scans(&self) {
        self.binary_scans.fetch_add(1, Ordering::Relaxed);
    }

    pub fn add_binaries_marked(&self, count: u64) {
        self.binaries_marked.fetch_add(count, Ordering::Relaxed);
    }

    /// Render the current values as a JSON object
    pub fn to_json(&self) -> String {
        // Serializing a struct of u64 cannot fail
        serde_json::to_string(&self.snapshot()).unwrap_or_default()
    }

    /// Get all metrics as a snapshot
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            ids_generated: self.ids_generated.load(Ordering::Relaxed),
            documents_created: self.documents_created.load(Ordering::Relaxed),
            documents_updated: self.documents_updated.load(Ordering::Relaxed),
            documents_deleted: self.documents_deleted.load(Ordering::Relaxed),
            queries: self.queries.load(Ordering::Relaxed),
            locks_acquired: self.locks_acquired.load(Ordering::Relaxed),
            lock_conflicts: self.lock_conflicts.load(Ordering::Relaxed),
            locks_removed: self.locks_removed.load(Ordering::Relaxed),
            lock_removal_mismatches: self.lock_removal_mismatches.load(Ordering::Relaxed),
            binary_scans: self.binary_scans.load(Ordering::Relaxed),
            binaries_marked: self.binaries_marked.load(Ordering::Relaxed),
        }
    }
}

/// A point-in-time snapshot of all metrics
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MetricsSnapshot {
    pub ids_generated: u64,
    pub documents_created: u64,
    pub documents_updated: u64,
    pub documents_deleted: u64,
    pub queries: u64,
    pub locks_acquired: u64,
    pub lock_conflicts: u64,
    pub locks_removed: u64,
    pub lock_removal_mismatches: u64,
    pub binary_scans: u64,
    pub binaries_marked: u64,
}
