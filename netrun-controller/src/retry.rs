use std::time::Duration;

/// Generalized retry/backoff policy wrapping a controller's `connect()`
/// hook, for protocol adapters whose bind/connect step can fail
/// transiently (a Modbus socket, an OPC UA session, ...).
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, base_delay: Duration) -> Self {
        RetryPolicy { max_attempts, base_delay }
    }

    /// Exponential backoff delay before attempt number `attempt` (1-based).
    pub fn delay_for(&self, attempt: u32) -> Duration {
        self.base_delay.saturating_mul(1u32 << attempt.min(16).saturating_sub(1).max(0))
    }
}

impl Default for RetryPolicy {
    /// Three attempts, starting at 500ms and doubling — a transient bind
    /// failure shouldn't crash the controller, but retrying shouldn't be
    /// indefinite either.
    fn default() -> Self {
        RetryPolicy::new(3, Duration::from_millis(500))
    }
}
