use std::sync::Arc;

use dashmap::DashMap;
use netrun_core::{RuntimeError, SourceClass};

/// Registry of source *classes* (parsers), keyed by `type_name`.
/// Populated once at process start by every linked protocol adapter —
/// static registration rather than load-time side effects.
#[derive(Clone, Default)]
pub struct ClassRegistry {
    classes: Arc<DashMap<&'static str, SourceClass>>,
}

impl ClassRegistry {
    pub fn new() -> Self {
        ClassRegistry {
            classes: Arc::new(DashMap::new()),
        }
    }

    /// Register a source class. Re-registering the same `type_name` is a
    /// configuration error — class identities are fixed at process start,
    /// never replaced at runtime.
    pub fn register(&self, class: SourceClass) -> Result<(), RuntimeError> {
        if self.classes.contains_key(class.type_name) {
            return Err(RuntimeError::Config(format!(
                "source class `{}` already registered",
                class.type_name
            )));
        }
        self.classes.insert(class.type_name, class);
        Ok(())
    }

    pub fn get(&self, type_name: &str) -> Option<SourceClass> {
        self.classes.get(type_name).map(|entry| entry.value().clone())
    }

    pub fn known_types(&self) -> Vec<&'static str> {
        self.classes.iter().map(|entry| *entry.key()).collect()
    }
}
