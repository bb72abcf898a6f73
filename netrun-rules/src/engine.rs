use std::sync::{Arc, RwLock, Weak};
use std::time::{Duration, SystemTime};

use dashmap::DashMap;
use netrun_bus::{recv_timeout, Bus, ToController, ToRule};
use netrun_core::{
    same_expression, Expression, RuntimeError, SetCallback, Source, SourceClassArgs, SourceReference, SourceValue, Tick,
};
use netrun_registry::{ClassRegistry, SourceRegistry};
use netrun_telemetry::Statistics;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::declaration::{ExpressionInfo, SourceInfo};

/// Default bounded-wait between incoming-queue polls, matching
/// `netrun-controller`'s default — every loop iteration polls the
/// interrupt.
pub const DEFAULT_DEQUEUE_TIMEOUT: Duration = Duration::from_millis(200);

/// A worker hosting expressions: owns setup-time source
/// materialization/dedup, the `reference -> expressions` fan-out index,
/// tick broadcasting, and the run loop dispatching `RUN_EXPRESSION`.
pub struct RuleEngine {
    name: String,
    bus: Bus,
    registry: SourceRegistry,
    classes: ClassRegistry,
    stats: Statistics,
    search_expression_by_reference: DashMap<SourceReference, Vec<Arc<Expression>>>,
    expressions: RwLock<Vec<Arc<Expression>>>,
    ticks: RwLock<Vec<Arc<Tick>>>,
}

impl RuleEngine {
    pub fn new(name: impl Into<String>, bus: Bus, registry: SourceRegistry, classes: ClassRegistry, stats: Statistics) -> Self {
        RuleEngine {
            name: name.into(),
            bus,
            registry,
            classes,
            stats,
            search_expression_by_reference: DashMap::new(),
            expressions: RwLock::new(Vec::new()),
            ticks: RwLock::new(Vec::new()),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Materialize an expression's source arguments (deduping against the
    /// registry), bind them, install write-back callbacks on new sources,
    /// and announce new sources to their owning controllers. Returns the
    /// number of arguments processed. Setup-fatal: an unresolvable source
    /// class is a `Config` error.
    pub async fn add_new_expression(&self, info: ExpressionInfo) -> Result<usize, RuntimeError> {
        if info.arguments.is_empty() {
            return Err(RuntimeError::Config(format!("{}: expression has no source arguments", self.name)));
        }

        let expr = Arc::new(Expression::new(info.evaluator));
        let mut source_count = 0;

        for source_info in &info.arguments {
            let class = self
                .classes
                .get(source_info.type_name)
                .ok_or_else(|| RuntimeError::Config(format!("unknown source type `{}`", source_info.type_name)))?;

            let constructed = Arc::new(class.construct(SourceClassArgs {
                rule: &self.name,
                controller: &source_info.controller,
                key: &source_info.key,
                default_value: source_info.default_value.clone(),
            }));

            let (arg, already_present) = match self.registry.get(constructed.reference()) {
                Some(existing) => (existing, true),
                None => (constructed, false),
            };

            self.maintain_searches(&arg, &expr);
            expr.add_arg(arg.clone());
            source_count += 1;

            if !already_present {
                arg.install_set_callback(write_back_callback(self.bus.clone(), &arg));
                self.registry.add(arg.clone())?;
                if let Err(err) = self.bus.send_to_controller(arg.controller(), ToController::AddSource(arg.clone())).await {
                    tracing::warn!(controller = arg.controller(), reference = %arg.reference(), error = %err, "failed to announce new source to its controller");
                }
            }
        }

        self.expressions.write().expect("expressions lock poisoned").push(expr);
        self.stats.set(format!("{}.expressions.count", self.name), self.expressions.read().unwrap().len() as i64);
        Ok(source_count)
    }

    fn maintain_searches(&self, source: &Arc<Source>, expr: &Arc<Expression>) {
        let mut entry = self.search_expression_by_reference.entry(source.reference().clone()).or_default();
        if !entry.iter().any(|existing| same_expression(existing, expr)) {
            entry.push(expr.clone());
        }
    }

    /// Expressions currently registered against a source's reference.
    pub fn expressions_for(&self, reference: &SourceReference) -> Vec<Arc<Expression>> {
        self.search_expression_by_reference
            .get(reference)
            .map(|entry| entry.clone())
            .unwrap_or_default()
    }

    pub fn setup_ticks(&self, controllers: &[String]) {
        let ticks = controllers.iter().map(|c| Arc::new(Tick::new(c.clone()))).collect();
        *self.ticks.write().expect("ticks lock poisoned") = ticks;
    }

    pub fn get_ticks(&self) -> Vec<Arc<Tick>> {
        self.ticks.read().expect("ticks lock poisoned").clone()
    }

    pub async fn send_ticks(&self) {
        for tick in self.get_ticks() {
            if let Err(err) = self
                .bus
                .send_to_controller(tick.controller(), ToController::Tick(tick.clone()))
                .await
            {
                tracing::warn!(controller = tick.controller(), error = %err, "failed to send tick");
            }
        }
    }

    pub fn process_ticks(&self) {
        for tick in self.get_ticks() {
            self.stats.set(format!("{}.ticks.timediff_ms", tick.controller()), tick.timediff().as_millis() as i64);
        }
    }

    /// Run loop: drain `RUN_EXPRESSION` messages until cancelled,
    /// dispatching each to every expression registered against the
    /// source's reference. A failing expression never kills the rule.
    pub async fn run(&self, mut rx: mpsc::Receiver<ToRule>, cancel: CancellationToken, dequeue_timeout: Duration) {
        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                message = recv_timeout(&mut rx, dequeue_timeout) => {
                    if let Some(ToRule::RunExpression(source)) = message {
                        self.handle_run_expression(&source);
                    }
                }
            }
        }
        tracing::info!(rule = %self.name, "rule engine shut down");
    }

    fn handle_run_expression(&self, source: &Arc<Source>) {
        for expr in self.expressions_for(source.reference()) {
            if let Err(err) = expr.run() {
                self.stats.increment(format!("{}.expression.error.count", self.name), 1);
                tracing::error!(rule = %self.name, expression = expr.name(), error = %err, "expression evaluation failed");
            }
        }
    }
}

/// Turns a rule-driven `Source::set` call into a `WRITE_SOURCE` message on
/// the owning controller's queue — callback-driven mutation, no leaking
/// the bus type into `Source`. Holds only a `Weak` reference to the
/// source it's installed on, since the source itself owns this closure —
/// a strong reference here would be a cycle.
fn write_back_callback(bus: Bus, source: &Arc<Source>) -> SetCallback {
    let weak: Weak<Source> = Arc::downgrade(source);
    Arc::new(move |value: SourceValue| {
        let bus = bus.clone();
        let weak = weak.clone();
        tokio::spawn(async move {
            let Some(source) = weak.upgrade() else { return };
            let stime = SystemTime::now();
            if let Err(err) = bus
                .send_to_controller(source.controller(), ToController::WriteSource(source.clone(), value, stime))
                .await
            {
                tracing::warn!(controller = source.controller(), reference = %source.reference(), error = %err, "failed to enqueue write-back");
            }
        });
    })
}
