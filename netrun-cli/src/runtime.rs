use std::sync::Arc;
use std::time::Duration;

use netrun_bus::Bus;
use netrun_config::RuntimeConfig;
use netrun_controller::{run_controller, ControllerContext, ControllerOptions, RetryPolicy};
use netrun_internal::{dict_source_class, InternalController};
use netrun_registry::{ClassRegistry, SourceRegistry};
use netrun_rules::RuleEngine;
use netrun_telemetry::Statistics;
use tokio_util::sync::CancellationToken;

/// Interval between tick broadcasts — cheap liveness signal for otherwise
/// idle controllers.
const TICK_INTERVAL: Duration = Duration::from_secs(5);

/// Every background task plus the shared handles a caller needs to print
/// final statistics once they've all exited.
pub struct RunningRuntime {
    pub stats: Statistics,
    pub registry: SourceRegistry,
    pub cancel: CancellationToken,
    pub tasks: Vec<tokio::task::JoinHandle<()>>,
}

impl RunningRuntime {
    /// Wait for every spawned task to finish (expected after `cancel` is
    /// set) and return the final statistics snapshot.
    pub async fn join(mut self) -> Vec<(String, i64)> {
        for task in self.tasks.drain(..) {
            let _ = task.await;
        }
        self.stats.snapshot()
    }
}

fn merge_options(base: ControllerOptions, overrides: Option<&netrun_config::ControllerOptionsConfig>) -> ControllerOptions {
    let Some(overrides) = overrides else { return base };
    ControllerOptions {
        send_events_on_internal: overrides.send_events_on_internal.unwrap_or(base.send_events_on_internal),
        send_events_on_external: overrides.send_events_on_external.unwrap_or(base.send_events_on_external),
        oldnew_comparision: overrides.oldnew_comparision.unwrap_or(base.oldnew_comparision),
        send_init_event: overrides.send_init_event.unwrap_or(base.send_init_event),
    }
}

/// Wire every component together and start the runtime: the bus, the
/// registries, the statistics sink, one task per enabled controller, the
/// rule engine's run loop, and the tick broadcaster.
///
/// Only `InternalController` is wired today — it is the reference adapter;
/// a real deployment registers its own protocol controllers the same way
/// this function registers the internal one.
pub fn start(config: &RuntimeConfig) -> RunningRuntime {
    let bus = Bus::new();
    let registry = SourceRegistry::new();
    let classes = ClassRegistry::new();
    let stats = Statistics::new();
    let cancel = CancellationToken::new();

    classes.register(dict_source_class()).expect("DictSource registered exactly once at startup");

    let mut tasks = Vec::new();
    let enabled = config.enabled_controllers();

    for name in &enabled {
        let options = merge_options(ControllerOptions::default(), config.controller_options.get(name));
        let controller = Arc::new(InternalController::new(name.clone(), options));
        let ctx = ControllerContext::new(bus.clone(), registry.clone(), classes.clone(), stats.clone(), cancel.clone());
        let rx = bus.register_controller(name.clone());

        tasks.push(tokio::spawn(run_controller(
            controller,
            ctx,
            rx,
            RetryPolicy::default(),
            netrun_controller::DEFAULT_DEQUEUE_TIMEOUT,
        )));
    }

    let engine = Arc::new(RuleEngine::new("cli", bus.clone(), registry.clone(), classes.clone(), stats.clone()));
    engine.setup_ticks(&enabled);
    let rule_rx = bus.register_rule("cli");

    let run_engine = engine.clone();
    let run_cancel = cancel.clone();
    tasks.push(tokio::spawn(async move {
        run_engine.run(rule_rx, run_cancel, netrun_rules::DEFAULT_DEQUEUE_TIMEOUT).await;
    }));

    let ticker_engine = engine;
    let ticker_cancel = cancel.clone();
    tasks.push(tokio::spawn(async move {
        loop {
            tokio::select! {
                _ = ticker_cancel.cancelled() => break,
                _ = tokio::time::sleep(TICK_INTERVAL) => {
                    ticker_engine.send_ticks().await;
                    ticker_engine.process_ticks();
                }
            }
        }
    }));

    RunningRuntime { stats, registry, cancel, tasks }
}
