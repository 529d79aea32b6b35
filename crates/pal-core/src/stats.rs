//! Decision counters.
//!
//! Counters sit on the hot path and are bumped on every single decision, so
//! they are plain atomics with no lock anywhere near them. There is no
//! cross-counter invariant to maintain: each field only needs to read as a
//! value it actually held, which relaxed ordering gives us.

use std::sync::atomic::{AtomicU64, Ordering};

/// Live counters for one engine instance.
#[derive(Debug, Default)]
pub struct TrafficStats {
    blocked: AtomicU64,
    allowed: AtomicU64,
    saved_bytes: AtomicU64,
}

/// Immutable point-in-time copy of the counters. Never aliases the live
/// values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StatsSnapshot {
    pub blocked: u64,
    pub allowed: u64,
    pub saved_bytes: u64,
}

impl StatsSnapshot {
    /// Total decisions in this snapshot.
    pub fn decisions(&self) -> u64 {
        self.blocked + self.allowed
    }

    /// Percentage of decisions that blocked, 0.0 when nothing was decided.
    pub fn block_rate(&self) -> f64 {
        if self.decisions() == 0 {
            0.0
        } else {
            (self.blocked as f64 / self.decisions() as f64) * 100.0
        }
    }
}

impl TrafficStats {
    pub const fn new() -> Self {
        Self {
            blocked: AtomicU64::new(0),
            allowed: AtomicU64::new(0),
            saved_bytes: AtomicU64::new(0),
        }
    }

    #[inline]
    pub fn record_blocked(&self, saved_bytes: u64) {
        self.blocked.fetch_add(1, Ordering::Relaxed);
        self.saved_bytes.fetch_add(saved_bytes, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_allowed(&self) {
        self.allowed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            blocked: self.blocked.load(Ordering::Relaxed),
            allowed: self.allowed.load(Ordering::Relaxed),
            saved_bytes: self.saved_bytes.load(Ordering::Relaxed),
        }
    }

    /// Zero the counters and return what they held. Each counter uses an
    /// atomic swap, so a concurrent increment lands in either the returned
    /// snapshot or the fresh epoch, never in both and never in neither.
    pub fn reset(&self) -> StatsSnapshot {
        StatsSnapshot {
            blocked: self.blocked.swap(0, Ordering::Relaxed),
            allowed: self.allowed.swap(0, Ordering::Relaxed),
            saved_bytes: self.saved_bytes.swap(0, Ordering::Relaxed),
        }
    }
}

// =============================================================================
// Transfer Size Estimation
// =============================================================================

/// Source of the "data saved" byte count for a blocked request.
///
/// The boundary has no response sizes to work with, so the default estimator
/// charges a flat amount per blocked request. Callers that do know transfer
/// sizes go through [`crate::engine::Engine::evaluate_sized`] instead.
pub trait TransferEstimator: Send + Sync {
    /// Bytes this request would have transferred had it not been blocked.
    fn estimate(&self, url: &str) -> u64;
}

/// Flat per-request estimate.
#[derive(Debug, Clone, Copy)]
pub struct FixedEstimator {
    per_request: u64,
}

impl FixedEstimator {
    /// Rough average ad payload (script plus creative).
    pub const DEFAULT_BYTES: u64 = 30_000;

    pub fn new(per_request: u64) -> Self {
        Self { per_request }
    }
}

impl Default for FixedEstimator {
    fn default() -> Self {
        Self::new(Self::DEFAULT_BYTES)
    }
}

impl TransferEstimator for FixedEstimator {
    fn estimate(&self, _url: &str) -> u64 {
        self.per_request
    }
}
