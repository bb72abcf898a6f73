//! The Rule Engine: setup-time source materialization and dedup, the
//! `reference -> expressions` fan-out index, tick broadcasting, and the
//! run loop dispatching `RUN_EXPRESSION`.

mod declaration;
mod engine;

pub use declaration::{ExpressionInfo, SourceInfo};
pub use engine::{RuleEngine, DEFAULT_DEQUEUE_TIMEOUT};
