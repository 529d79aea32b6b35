//! One engine instance: the active rule set plus its counters.
//!
//! Concurrency contract: any number of threads may evaluate while one thread
//! installs a new rule set. Evaluation clones the `Arc` under the read lock
//! and matches outside it, so installation is a single pointer swap and no
//! reader ever sees a half-built set. Counters are lock-free and independent
//! of the rule-set lock.

use std::sync::{Arc, PoisonError, RwLock};

use log::debug;

use crate::ruleset::RuleSet;
use crate::stats::{FixedEstimator, StatsSnapshot, TrafficStats, TransferEstimator};
use crate::types::Verdict;

pub struct Engine {
    rules: RwLock<Arc<RuleSet>>,
    stats: TrafficStats,
    estimator: Box<dyn TransferEstimator>,
}

impl Engine {
    /// A fresh engine: no rules, zero counters, default transfer estimator.
    pub fn new() -> Self {
        Self::with_estimator(Box::new(FixedEstimator::default()))
    }

    pub fn with_estimator(estimator: Box<dyn TransferEstimator>) -> Self {
        Self {
            rules: RwLock::new(Arc::new(RuleSet::empty())),
            stats: TrafficStats::new(),
            estimator,
        }
    }

    /// Atomically replace the active rule set. The previous set is dropped
    /// once the last in-flight evaluation holding it finishes.
    pub fn install(&self, rules: RuleSet) {
        let rules = Arc::new(rules);
        debug!("installing rule set with {} rules", rules.rule_count());
        let mut guard = self.rules.write().unwrap_or_else(PoisonError::into_inner);
        *guard = rules;
    }

    /// Grab the active rule set. A poisoned lock still guards a structurally
    /// valid `Arc` (installs only ever swap the pointer), so recover rather
    /// than take filtering down with a panicked writer.
    pub fn active_rules(&self) -> Arc<RuleSet> {
        self.rules
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Evaluate one URL, charging data-saved via the configured estimator.
    pub fn evaluate(&self, url: &str) -> Verdict {
        self.evaluate_inner(url, None)
    }

    /// Evaluate one URL with a known transfer size, for callers that have
    /// response metadata in hand.
    pub fn evaluate_sized(&self, url: &str, transfer_bytes: u64) -> Verdict {
        self.evaluate_inner(url, Some(transfer_bytes))
    }

    fn evaluate_inner(&self, url: &str, transfer_bytes: Option<u64>) -> Verdict {
        // Fail open on empty input. Not a decision, so not counted.
        if url.is_empty() {
            return Verdict::Allow;
        }

        let rules = self.active_rules();
        let verdict = rules.decide(url);
        match verdict {
            Verdict::Block => {
                let saved = transfer_bytes.unwrap_or_else(|| self.estimator.estimate(url));
                self.stats.record_blocked(saved);
            }
            Verdict::Allow => self.stats.record_allowed(),
        }
        verdict
    }

    pub fn stats(&self) -> StatsSnapshot {
        self.stats.snapshot()
    }

    /// Zero the counters, returning what they held.
    pub fn reset_stats(&self) -> StatsSnapshot {
        let drained = self.stats.reset();
        debug!(
            "stats reset: {} blocked / {} allowed dropped",
            drained.blocked, drained.allowed
        );
        drained
    }

    pub fn rule_count(&self) -> usize {
        self.active_rules().rule_count()
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}
