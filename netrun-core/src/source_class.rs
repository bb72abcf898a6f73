use std::sync::Arc;

use crate::{Source, SourceValue};

/// Arguments passed to a [`SourceClass`]'s constructor when the rule engine
/// materializes a source from configuration.
pub struct SourceClassArgs<'a> {
    pub rule: &'a str,
    pub controller: &'a str,
    pub key: &'a str,
    pub default_value: SourceValue,
}

pub type SourceConstructor = Arc<dyn Fn(SourceClassArgs<'_>) -> Source + Send + Sync>;

/// A registered source *type* — the "parser" a controller needs to decode
/// protocol data into a source's value. `type_name` is what configuration
/// keys use to pick a class (`DictSource`, `HoldingRegisterSource`, ...);
/// `constructor` builds a concrete [`Source`] bound to a given `(rule,
/// controller, key)`.
#[derive(Clone)]
pub struct SourceClass {
    pub type_name: &'static str,
    pub constructor: SourceConstructor,
}

impl SourceClass {
    pub fn new(type_name: &'static str, constructor: SourceConstructor) -> Self {
        SourceClass { type_name, constructor }
    }

    pub fn construct(&self, args: SourceClassArgs<'_>) -> Source {
        (self.constructor)(args)
    }
}

impl std::fmt::Debug for SourceClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SourceClass").field("type_name", &self.type_name).finish()
    }
}
