//! Process-wide statistics sink.
//!
//! Every controller, the rule engine, and the bus report counters here,
//! as an explicit, injectable handle instead of a module-level global.
//!
//! Counters are a flat `namespace.key -> i64` map with dotted naming
//! (`"{controller}.sources.count"`, `"{rule}.ticks.timediff"`, ...).
//! Reads and writes go through `DashMap`, a sharded-lock map well suited
//! to "touched from many workers, atomicity per key is sufficient".

use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

use dashmap::DashMap;

/// A single named counter or gauge. Cheap to clone; all clones share the
/// same underlying value.
#[derive(Clone)]
struct Counter(Arc<AtomicI64>);

impl Counter {
    fn new(value: i64) -> Self {
        Counter(Arc::new(AtomicI64::new(value)))
    }
}

/// Shared statistics sink, cloneable and safe to hand to every worker.
#[derive(Clone, Default)]
pub struct Statistics {
    counters: Arc<DashMap<String, Counter>>,
}

impl Statistics {
    pub fn new() -> Self {
        Statistics {
            counters: Arc::new(DashMap::new()),
        }
    }

    /// Set a gauge-style counter to an absolute value.
    pub fn set(&self, key: impl Into<String>, value: i64) {
        let key = key.into();
        match self.counters.get(&key) {
            Some(counter) => counter.0.store(value, Ordering::Relaxed),
            None => {
                self.counters.insert(key, Counter::new(value));
            }
        }
    }

    /// Add `delta` to a counter, creating it at `delta` if absent.
    pub fn increment(&self, key: impl Into<String>, delta: i64) {
        let key = key.into();
        match self.counters.get(&key) {
            Some(counter) => {
                counter.0.fetch_add(delta, Ordering::Relaxed);
            }
            None => {
                self.counters.insert(key, Counter::new(delta));
            }
        }
    }

    pub fn get(&self, key: &str) -> Option<i64> {
        self.counters.get(key).map(|c| c.0.load(Ordering::Relaxed))
    }

    /// Snapshot every counter currently recorded, for diagnostics/CLI
    /// output.
    pub fn snapshot(&self) -> Vec<(String, i64)> {
        self.counters
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().0.load(Ordering::Relaxed)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_then_get_round_trips() {
        let stats = Statistics::new();
        stats.set("plc1.sources.count", 3);
        assert_eq!(stats.get("plc1.sources.count"), Some(3));
    }

    #[test]
    fn increment_creates_and_accumulates() {
        let stats = Statistics::new();
        stats.increment("rule1.incoming.count", 1);
        stats.increment("rule1.incoming.count", 2);
        assert_eq!(stats.get("rule1.incoming.count"), Some(3));
    }

    #[test]
    fn missing_key_reads_none() {
        let stats = Statistics::new();
        assert_eq!(stats.get("missing"), None);
    }

    #[test]
    fn shared_clones_observe_the_same_counters() {
        let stats = Statistics::new();
        let clone = stats.clone();
        stats.set("x", 1);
        assert_eq!(clone.get("x"), Some(1));
    }
}
