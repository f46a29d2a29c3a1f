//! Metrics registry for the select pipeline
//!
//! - Counters only
//! - Monotonic increase
//! - Thread-safe but lock-free

use std::sync::atomic::{AtomicU64, Ordering};

/// Select counters
///
/// All counters use Relaxed ordering; exact interleaving between counters
/// is not observable and not needed.
#[derive(Debug, Default)]
pub struct MetricsRegistry {
    /// Select calls that reached the store
    selects_executed: AtomicU64,
    /// Select calls resolved empty without a store query
    selects_short_circuited: AtomicU64,
    /// Select calls that failed
    selects_failed: AtomicU64,
    /// Term leaves dropped for unregistered operators
    terms_dropped: AtomicU64,
    /// Primary queries issued
    primary_queries: AtomicU64,
    /// Descendant queries issued
    descendant_queries: AtomicU64,
    /// Descendants that surfaced in a forest
    descendants_attached: AtomicU64,
    /// Descendants fetched but never surfaced
    descendants_orphaned: AtomicU64,
}

impl MetricsRegistry {
    /// Create a new registry with all counters at zero
    pub fn new() -> Self {
        Self::default()
    }

    /// Increment selects that reached the store
    pub fn increment_selects_executed(&self) {
        self.selects_executed.fetch_add(1, Ordering::Relaxed);
    }

    /// Increment selects resolved empty without a store query
    pub fn increment_selects_short_circuited(&self) {
        self.selects_short_circuited.fetch_add(1, Ordering::Relaxed);
    }

    /// Increment failed selects
    pub fn increment_selects_failed(&self) {
        self.selects_failed.fetch_add(1, Ordering::Relaxed);
    }

    /// Add dropped term leaves
    pub fn add_terms_dropped(&self, count: u64) {
        self.terms_dropped.fetch_add(count, Ordering::Relaxed);
    }

    /// Increment primary queries issued
    pub fn increment_primary_queries(&self) {
        self.primary_queries.fetch_add(1, Ordering::Relaxed);
    }

    /// Increment descendant queries issued
    pub fn increment_descendant_queries(&self) {
        self.descendant_queries.fetch_add(1, Ordering::Relaxed);
    }

    /// Add descendants that surfaced in a forest
    pub fn add_descendants_attached(&self, count: u64) {
        self.descendants_attached.fetch_add(count, Ordering::Relaxed);
    }

    /// Add descendants fetched but never surfaced
    pub fn add_descendants_orphaned(&self, count: u64) {
        self.descendants_orphaned.fetch_add(count, Ordering::Relaxed);
    }

    /// Take a point-in-time copy of every counter
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            selects_executed: self.selects_executed.load(Ordering::Relaxed),
            selects_short_circuited: self.selects_short_circuited.load(Ordering::Relaxed),
            selects_failed: self.selects_failed.load(Ordering::Relaxed),
            terms_dropped: self.terms_dropped.load(Ordering::Relaxed),
            primary_queries: self.primary_queries.load(Ordering::Relaxed),
            descendant_queries: self.descendant_queries.load(Ordering::Relaxed),
            descendants_attached: self.descendants_attached.load(Ordering::Relaxed),
            descendants_orphaned: self.descendants_orphaned.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time copy of the select counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub selects_executed: u64,
    pub selects_short_circuited: u64,
    pub selects_failed: u64,
    pub terms_dropped: u64,
    pub primary_queries: u64,
    pub descendant_queries: u64,
    pub descendants_attached: u64,
    pub descendants_orphaned: u64,
}
