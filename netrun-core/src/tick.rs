use std::sync::RwLock;
use std::time::{Duration, SystemTime};

/// Heartbeat record for one controller: `(controller_name, last_tick_time)`.
///
/// Mutated only by the controller that receives the corresponding `TICK`
/// message (via [`Tick::record`]); observed by the rule engine for liveness
/// telemetry (via [`Tick::timediff`]). A controller that stops servicing
/// its incoming queue will show a monotonically growing `timediff`.
#[derive(Debug)]
pub struct Tick {
    controller: String,
    last_tick: RwLock<SystemTime>,
}

impl Tick {
    pub fn new(controller: impl Into<String>) -> Self {
        Tick {
            controller: controller.into(),
            last_tick: RwLock::new(SystemTime::now()),
        }
    }

    pub fn controller(&self) -> &str {
        &self.controller
    }

    /// Record a round trip: called by the controller's `TICK` handler.
    pub fn record(&self) {
        *self.last_tick.write().expect("tick lock poisoned") = SystemTime::now();
    }

    /// How long it's been since the controller last serviced a tick — the
    /// rule's liveness signal for that controller.
    pub fn timediff(&self) -> Duration {
        self.last_tick
            .read()
            .expect("tick lock poisoned")
            .elapsed()
            .unwrap_or_default()
    }
}
