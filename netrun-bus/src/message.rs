use std::sync::Arc;
use std::time::SystemTime;

use netrun_core::{Source, SourceClass, SourceValue, Tick};

/// Messages a rule (or the runtime itself, for ticks) sends to a
/// controller. Closed taxonomy — producers and consumers never see
/// anything outside this set.
#[derive(Clone)]
pub enum ToController {
    /// Adopt a newly materialized source.
    AddSource(Arc<Source>),
    /// Register a source class (parser) for later protocol decoding.
    AddParser(SourceClass),
    /// Request a refresh of a single source.
    ReadSource(Arc<Source>),
    /// Request a refresh of every adopted source.
    ReadAll,
    /// Apply a rule-driven write: `(source, new value, source_time)`.
    WriteSource(Arc<Source>, SourceValue, SystemTime),
    /// Heartbeat round trip.
    Tick(Arc<Tick>),
}

impl std::fmt::Debug for ToController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ToController::AddSource(s) => write!(f, "AddSource({})", s.reference()),
            ToController::AddParser(c) => write!(f, "AddParser({})", c.type_name),
            ToController::ReadSource(s) => write!(f, "ReadSource({})", s.reference()),
            ToController::ReadAll => write!(f, "ReadAll"),
            ToController::WriteSource(s, v, _) => write!(f, "WriteSource({}, {v})", s.reference()),
            ToController::Tick(t) => write!(f, "Tick({})", t.controller()),
        }
    }
}

/// Messages a controller sends to a rule: the source that just changed.
#[derive(Clone)]
pub enum ToRule {
    RunExpression(Arc<Source>),
}

impl std::fmt::Debug for ToRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ToRule::RunExpression(s) => write!(f, "RunExpression({})", s.reference()),
        }
    }
}
