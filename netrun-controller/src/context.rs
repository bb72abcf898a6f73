use netrun_bus::Bus;
use netrun_registry::{ClassRegistry, SourceRegistry};
use netrun_telemetry::Statistics;
use tokio_util::sync::CancellationToken;

/// The shared context every controller (and the rule engine) is handed at
/// construction: the Message Bus, the Source Registry, the class
/// registry, and the statistics sink. Configuration lookup itself lives
/// in `netrun-config`, loaded once at startup and handed to each
/// component alongside this context.
#[derive(Clone)]
pub struct ControllerContext {
    pub bus: Bus,
    pub registry: SourceRegistry,
    pub classes: ClassRegistry,
    pub stats: Statistics,
    pub cancel: CancellationToken,
}

impl ControllerContext {
    pub fn new(bus: Bus, registry: SourceRegistry, classes: ClassRegistry, stats: Statistics, cancel: CancellationToken) -> Self {
        ControllerContext {
            bus,
            registry,
            classes,
            stats,
            cancel,
        }
    }
}
