use std::sync::Arc;

use dashmap::DashMap;
use netrun_core::{RuntimeError, Source, SourceReference};

/// Process-wide `reference -> Source` map.
///
/// No eviction: once a source is adopted it lives for the process'
/// lifetime. Dedup is identity-aware — re-adding the *same* `Arc<Source>`
/// under its own reference is a no-op success, matching the setup path
/// where a rule's "has an instance for this reference already?" check
/// races a second rule materializing an identically-referenced source
/// from a different expression.
#[derive(Clone, Default)]
pub struct SourceRegistry {
    sources: Arc<DashMap<SourceReference, Arc<Source>>>,
}

impl SourceRegistry {
    pub fn new() -> Self {
        SourceRegistry {
            sources: Arc::new(DashMap::new()),
        }
    }

    /// Adopt `instance`. Fails with `DuplicateSource` only when a
    /// *different* instance already owns this reference; re-adding the
    /// same `Arc` is idempotent.
    pub fn add(&self, instance: Arc<Source>) -> Result<(), RuntimeError> {
        let reference = instance.reference().clone();
        match self.sources.entry(reference.clone()) {
            dashmap::mapref::entry::Entry::Vacant(slot) => {
                slot.insert(instance);
                Ok(())
            }
            dashmap::mapref::entry::Entry::Occupied(slot) => {
                if Arc::ptr_eq(slot.get(), &instance) {
                    Ok(())
                } else {
                    Err(RuntimeError::DuplicateSource(reference))
                }
            }
        }
    }

    pub fn has(&self, reference: &SourceReference) -> bool {
        self.sources.contains_key(reference)
    }

    pub fn get(&self, reference: &SourceReference) -> Option<Arc<Source>> {
        self.sources.get(reference).map(|entry| entry.value().clone())
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    /// Every source currently adopted by a given controller, for that
    /// controller's `READ_ALL` / teardown handling.
    pub fn for_controller(&self, controller: &str) -> Vec<Arc<Source>> {
        self.sources
            .iter()
            .filter(|entry| entry.value().controller() == controller)
            .map(|entry| entry.value().clone())
            .collect()
    }
}
