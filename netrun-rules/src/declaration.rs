use std::sync::Arc;

use netrun_core::{Evaluator, SourceValue};

/// Describes a source argument an expression needs, as read from
/// configuration. The rule engine materializes the actual `Source`
/// instance from this at setup time.
pub struct SourceInfo {
    pub type_name: &'static str,
    pub key: String,
    pub controller: String,
    pub default_value: SourceValue,
}

impl SourceInfo {
    pub fn new(type_name: &'static str, key: impl Into<String>, controller: impl Into<String>) -> Self {
        SourceInfo {
            type_name,
            key: key.into(),
            controller: controller.into(),
            default_value: SourceValue::Unset,
        }
    }

    pub fn with_default(mut self, default_value: SourceValue) -> Self {
        self.default_value = default_value;
        self
    }
}

/// Describes an expression and the source arguments it needs bound, as
/// read from configuration.
pub struct ExpressionInfo {
    pub evaluator: Arc<dyn Evaluator>,
    pub arguments: Vec<SourceInfo>,
}

impl ExpressionInfo {
    pub fn new(evaluator: Arc<dyn Evaluator>, arguments: Vec<SourceInfo>) -> Self {
        ExpressionInfo { evaluator, arguments }
    }
}
