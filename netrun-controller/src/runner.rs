use std::sync::Arc;
use std::time::Duration;

use netrun_bus::{recv_timeout, ToController};
use tokio::sync::mpsc;

use crate::context::ControllerContext;
use crate::controller::Controller;
use crate::retry::RetryPolicy;

/// Default bounded-wait used by [`run_controller`] between incoming-queue
/// polls — long enough to be cheap, short enough that shutdown feels
/// immediate.
pub const DEFAULT_DEQUEUE_TIMEOUT: Duration = Duration::from_millis(200);

/// The base controller loop: connect with retry, then alternate draining
/// the incoming queue and honoring the interrupt until cancellation, then
/// tear down.
///
/// This realizes `loop_incoming` directly; `loop_outgoing` (polling the
/// external protocol for adopted sources) is adapter-specific and, when a
/// controller needs it, is driven from inside `handle_read_all`/`connect`
/// rather than by this loop — most adapters are push-driven from their
/// protocol stack and only ever react to incoming messages.
pub async fn run_controller(
    controller: Arc<dyn Controller>,
    ctx: ControllerContext,
    mut rx: mpsc::Receiver<ToController>,
    retry: RetryPolicy,
    dequeue_timeout: Duration,
) {
    let name = controller.name().to_string();

    let mut attempt = 0u32;
    loop {
        attempt += 1;
        match controller.connect(&ctx).await {
            Ok(()) => break,
            Err(err) => {
                ctx.stats.increment(format!("{name}.connect_errors"), 1);
                tracing::warn!(controller = %name, attempt, error = %err, "controller connect failed");
                if attempt >= retry.max_attempts {
                    tracing::error!(controller = %name, attempts = attempt, "controller giving up on connect");
                    return;
                }
                tokio::time::sleep(retry.delay_for(attempt)).await;
            }
        }
    }

    tracing::info!(controller = %name, "controller connected");

    loop {
        tokio::select! {
            _ = ctx.cancel.cancelled() => break,
            message = recv_timeout(&mut rx, dequeue_timeout) => {
                if let Some(message) = message {
                    dispatch(controller.as_ref(), &ctx, message).await;
                }
            }
        }
    }

    controller.teardown(&ctx).await;
    tracing::info!(controller = %name, "controller shut down");
}

async fn dispatch(controller: &dyn Controller, ctx: &ControllerContext, message: ToController) {
    let result = match message {
        ToController::AddSource(source) => controller.handle_add_source(ctx, source).await,
        ToController::AddParser(class) => controller.handle_add_parser(ctx, class).await,
        ToController::ReadSource(source) => controller.handle_read_source(ctx, source).await,
        ToController::ReadAll => controller.handle_read_all(ctx).await,
        ToController::WriteSource(source, value, stime) => {
            controller.handle_write_source(ctx, source, value, stime).await
        }
        ToController::Tick(tick) => {
            controller.handle_tick(ctx, tick).await;
            Ok(())
        }
    };

    if let Err(err) = result {
        ctx.stats.increment(format!("{}.handler_errors", controller.name()), 1);
        tracing::error!(controller = controller.name(), error = %err, "message handler failed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use netrun_bus::Bus;
    use netrun_core::{RuntimeError, Source, SourceValue};
    use netrun_registry::{ClassRegistry, SourceRegistry};
    use netrun_telemetry::Statistics;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::SystemTime;
    use tokio_util::sync::CancellationToken;

    struct CountingController {
        options: crate::ControllerOptions,
        writes: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl Controller for CountingController {
        fn name(&self) -> &str {
            "counting"
        }

        fn options(&self) -> &crate::ControllerOptions {
            &self.options
        }

        async fn handle_write_source(
            &self,
            _ctx: &ControllerContext,
            _source: Arc<Source>,
            _value: SourceValue,
            _stime: SystemTime,
        ) -> Result<(), RuntimeError> {
            self.writes.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    fn test_context() -> (ControllerContext, CancellationToken) {
        let cancel = CancellationToken::new();
        let ctx = ControllerContext::new(
            Bus::new(),
            SourceRegistry::new(),
            ClassRegistry::new(),
            Statistics::new(),
            cancel.clone(),
        );
        (ctx, cancel)
    }

    #[tokio::test]
    async fn dispatches_write_source_to_the_controller() {
        let (ctx, cancel) = test_context();
        let writes = Arc::new(AtomicUsize::new(0));
        let controller = Arc::new(CountingController {
            options: crate::ControllerOptions::default(),
            writes: writes.clone(),
        });
        let bus = ctx.bus.clone();
        let rx = bus.register_controller("plc1");

        let handle = tokio::spawn(run_controller(
            controller,
            ctx,
            rx,
            RetryPolicy::default(),
            Duration::from_millis(20),
        ));

        let source = Arc::new(Source::new("tag1", "plc1", "rule1", "Test"));
        bus.send_to_controller(
            "plc1",
            ToController::WriteSource(source, SourceValue::Int(1), SystemTime::now()),
        )
        .await
        .unwrap();

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(writes.load(Ordering::SeqCst), 1);

        cancel.cancel();
        handle.await.unwrap();
    }

    #[tokio::test]
    async fn loop_exits_promptly_once_cancelled() {
        let (ctx, cancel) = test_context();
        let controller = Arc::new(CountingController {
            options: crate::ControllerOptions::default(),
            writes: Arc::new(AtomicUsize::new(0)),
        });
        let bus = ctx.bus.clone();
        let rx = bus.register_controller("plc1");

        let handle = tokio::spawn(run_controller(
            controller,
            ctx,
            rx,
            RetryPolicy::default(),
            Duration::from_secs(5),
        ));

        cancel.cancel();
        tokio::time::timeout(Duration::from_millis(200), handle)
            .await
            .expect("controller loop should exit promptly on cancellation")
            .unwrap();
    }
}
