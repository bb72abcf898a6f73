//! End-to-end scenarios, one test per named scenario.
//!
//! S2 exercises old/new suppression once a source is `Initial` *or*
//! `Good`, not only once it's `Good` — a good observation fires exactly
//! when it changes the value or moves status out of `None`/`Invalid`.
//! See DESIGN.md for the recorded reasoning on this corner case.

use std::sync::Arc;
use std::time::{Duration, SystemTime};

use netrun_bus::{Bus, ToController, ToRule};
use netrun_controller::{
    run_controller, update_source_instance_value, Controller, ControllerContext, ControllerOptions, RawStatus, RetryPolicy,
};
use netrun_core::{Source, SourceClassArgs, SourceValue, StatusCode, Tick};
use netrun_internal::{dict_source_class, InternalController};
use netrun_registry::{ClassRegistry, SourceRegistry};
use netrun_rules::{ExpressionInfo, RuleEngine, SourceInfo};
use netrun_telemetry::Statistics;
use tokio_util::sync::CancellationToken;

fn context() -> ControllerContext {
    ControllerContext::new(
        Bus::new(),
        SourceRegistry::new(),
        ClassRegistry::new(),
        Statistics::new(),
        CancellationToken::new(),
    )
}

#[tokio::test]
async fn s1_internal_echo() {
    let ctx = context();
    let mut rule_rx = ctx.bus.register_rule("rule1");
    let controller = InternalController::new(
        "internal",
        ControllerOptions {
            send_events_on_internal: true,
            ..ControllerOptions::default()
        },
    );

    let source = Arc::new(Source::new("X", "internal", "rule1", "DictSource"));
    ctx.registry.add(source.clone()).unwrap();

    controller
        .handle_write_source(&ctx, source.clone(), SourceValue::Int(42), SystemTime::now())
        .await
        .unwrap();

    assert_eq!(source.value(), SourceValue::Int(42));
    assert_eq!(source.status(), StatusCode::Initial);

    let ToRule::RunExpression(fired) = rule_rx.try_recv().unwrap();
    assert_eq!(fired.reference(), source.reference());
    assert!(rule_rx.try_recv().is_err(), "exactly one RUN_EXPRESSION must be delivered");
}

#[tokio::test]
async fn s2_suppression_once_settled() {
    let ctx = context();
    let mut rule_rx = ctx.bus.register_rule("rule1");
    let controller = InternalController::new(
        "internal",
        ControllerOptions {
            send_events_on_internal: true,
            oldnew_comparision: true,
            ..ControllerOptions::default()
        },
    );
    let source = Arc::new(Source::new("X", "internal", "rule1", "DictSource"));
    ctx.registry.add(source.clone()).unwrap();

    controller
        .handle_write_source(&ctx, source.clone(), SourceValue::Int(42), SystemTime::now())
        .await
        .unwrap();
    assert_eq!(source.status(), StatusCode::Initial);
    rule_rx.try_recv().expect("None -> Initial must fire");

    controller
        .handle_write_source(&ctx, source.clone(), SourceValue::Int(42), SystemTime::now())
        .await
        .unwrap();
    assert!(rule_rx.try_recv().is_err(), "identical value while Initial is suppressed");

    controller
        .handle_write_source(&ctx, source.clone(), SourceValue::Int(7), SystemTime::now())
        .await
        .unwrap();
    assert_eq!(source.status(), StatusCode::Good);
    rule_rx.try_recv().expect("a changed value must fire even while settling into Good");

    controller
        .handle_write_source(&ctx, source.clone(), SourceValue::Int(7), SystemTime::now())
        .await
        .unwrap();
    assert!(rule_rx.try_recv().is_err(), "identical value while Good must be suppressed");
}

#[tokio::test]
async fn s3_bad_observation_from_none_never_arms_the_source() {
    struct NeverPromote;
    #[async_trait::async_trait]
    impl Controller for NeverPromote {
        fn name(&self) -> &str {
            "external"
        }
        fn options(&self) -> &ControllerOptions {
            static OPTS: std::sync::OnceLock<ControllerOptions> = std::sync::OnceLock::new();
            OPTS.get_or_init(ControllerOptions::default)
        }
        async fn handle_write_source(
            &self,
            _ctx: &ControllerContext,
            _source: Arc<Source>,
            _value: SourceValue,
            _stime: SystemTime,
        ) -> netrun_controller::RuntimeResult<()> {
            Ok(())
        }
    }

    let y = Source::new("Y", "external", "rule1", "DictSource");
    let controller = NeverPromote;

    let fired = update_source_instance_value(
        &controller,
        &y,
        SourceValue::Int(0),
        SystemTime::now(),
        RawStatus { status_ok: false, code: "Bad" },
        false,
    );

    assert!(!fired);
    assert_eq!(y.status(), StatusCode::None);
}

#[tokio::test]
async fn s4_deduplication_at_setup() {
    let bus = Bus::new();
    let registry = SourceRegistry::new();
    let classes = ClassRegistry::new();
    classes.register(dict_source_class()).unwrap();
    let stats = Statistics::new();

    let mut controller_rx = bus.register_controller("plc1");
    let engine = RuleEngine::new("rule1", bus.clone(), registry.clone(), classes, stats);

    struct NoopEvaluator;
    impl netrun_core::Evaluator for NoopEvaluator {
        fn run(&self, _args: &[Arc<Source>]) -> netrun_core::Result<()> {
            Ok(())
        }
    }

    let first = ExpressionInfo::new(Arc::new(NoopEvaluator), vec![SourceInfo::new("DictSource", "tagA", "plc1")]);
    let second = ExpressionInfo::new(Arc::new(NoopEvaluator), vec![SourceInfo::new("DictSource", "tagA", "plc1")]);

    engine.add_new_expression(first).await.unwrap();
    engine.add_new_expression(second).await.unwrap();

    assert_eq!(registry.len(), 1, "two expressions over the same reference dedup to one Source");

    let reference = netrun_core::SourceReference::new("plc1", "DictSource", "tagA");
    assert_eq!(engine.expressions_for(&reference).len(), 2, "both expressions must hold the shared instance");

    controller_rx.try_recv().expect("exactly one ADD_SOURCE reaches the controller");
    assert!(controller_rx.try_recv().is_err(), "a duplicate add must not reach the controller a second time");
}

#[tokio::test]
async fn s5_tick_liveness() {
    let tick = Tick::new("plc1");
    tokio::time::sleep(Duration::from_millis(30)).await;
    let lag = tick.timediff();
    assert!(lag >= Duration::from_millis(30));

    tick.record();
    assert!(tick.timediff() < lag);
}

#[tokio::test]
async fn s6_shutdown_every_worker_exits_promptly() {
    let bus = Bus::new();
    let registry = SourceRegistry::new();
    let classes = ClassRegistry::new();
    classes.register(dict_source_class()).unwrap();
    let stats = Statistics::new();
    let cancel = CancellationToken::new();

    let mut tasks = Vec::new();

    for name in ["c1", "c2", "c3"] {
        let controller = Arc::new(InternalController::new(name, ControllerOptions::default()));
        let ctx = ControllerContext::new(bus.clone(), registry.clone(), classes.clone(), stats.clone(), cancel.clone());
        let rx = bus.register_controller(name);
        tasks.push(tokio::spawn(run_controller(
            controller,
            ctx,
            rx,
            RetryPolicy::default(),
            Duration::from_millis(20),
        )));
    }

    for name in ["rule1", "rule2"] {
        let engine = Arc::new(RuleEngine::new(name, bus.clone(), registry.clone(), classes.clone(), stats.clone()));
        let rx = bus.register_rule(name);
        let engine_cancel = cancel.clone();
        tasks.push(tokio::spawn(async move {
            engine.run(rx, engine_cancel, Duration::from_millis(20)).await;
        }));
    }

    cancel.cancel();

    for task in tasks {
        tokio::time::timeout(Duration::from_millis(500), task)
            .await
            .expect("every worker must exit within the dequeue timeout bound")
            .unwrap();
    }

    // Also exercise the source-construction helper so SourceClassArgs stays linked in.
    let class = dict_source_class();
    let _ = class.construct(SourceClassArgs {
        rule: "rule1",
        controller: "c1",
        key: "tagZ",
        default_value: SourceValue::Unset,
    });
}
