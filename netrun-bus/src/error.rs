use thiserror::Error;

/// Failures surfaced by the Message Bus. Distinct from
/// [`netrun_core::RuntimeError`] because these are wiring problems
/// (unknown queue name, queue hung up) rather than domain errors.
#[derive(Debug, Error)]
pub enum BusError {
    #[error("no controller queue registered for {0}")]
    UnknownController(String),
    #[error("no rule queue registered for {0}")]
    UnknownRule(String),
    #[error("queue {0} closed: consumer task has exited")]
    Closed(String),
}
