//! Palisade Core Library
//!
//! The filtering engine behind the mobile boundary: compiled rule sets, URL
//! decomposition, decision evaluation, and traffic counters.
//!
//! # Concurrency
//!
//! One [`Engine`] serves many threads. The active [`RuleSet`] is an immutable
//! snapshot behind an `RwLock<Arc<_>>`: evaluations clone the `Arc` and match
//! lock-free, installs swap the pointer. Statistics are plain atomics touched
//! on every decision.
//!
//! # Modules
//!
//! - `hash`: Murmur3 hash functions for domain set lookups
//! - `url`: Fast URL decomposition without allocations
//! - `types`: Verdicts, parsed rules, compiled patterns
//! - `ruleset`: The compiled matching structure and decision procedure
//! - `stats`: Atomic counters and transfer-size estimation
//! - `engine`: One engine instance (rule set + counters)

pub mod engine;
pub mod hash;
pub mod ruleset;
pub mod stats;
pub mod types;
pub mod url;

// Re-export commonly used types
pub use engine::Engine;
pub use hash::{hash64, hash_domain};
pub use ruleset::RuleSet;
pub use stats::{FixedEstimator, StatsSnapshot, TrafficStats, TransferEstimator};
pub use types::{Anchor, Pattern, Rule, Verdict};
