use std::sync::{Arc, RwLock};

use crate::{RuntimeError, Source};

/// The expression evaluator, supplied by an external collaborator — the
/// expression language and its evaluator are out of scope here.
///
/// `netrun-rules` only needs to know how to hand a bound argument list to
/// something that runs it and reports failure — everything else about the
/// language is opaque to the runtime.
pub trait Evaluator: Send + Sync {
    /// Run the expression body against its bound source arguments.
    ///
    /// Implementations read from `args` and call [`Source::set`] on any of
    /// them to push a write back through the owning controller. A failing
    /// evaluator returns `Err` and must not panic — `netrun-rules` counts
    /// and logs the failure but keeps the rule alive.
    fn run(&self, args: &[Arc<Source>]) -> Result<(), RuntimeError>;

    /// Human-readable name for logs and telemetry keys.
    fn name(&self) -> &str {
        "expression"
    }
}

/// An evaluator callable plus its ordered, bound source arguments.
///
/// Arguments are appended at setup time via [`Expression::add_arg`] and
/// never removed; the same `Expression` (by `Arc` identity) may be
/// registered against several sources' fan-out lists in the rule engine.
pub struct Expression {
    evaluator: Arc<dyn Evaluator>,
    args: RwLock<Vec<Arc<Source>>>,
}

impl Expression {
    pub fn new(evaluator: Arc<dyn Evaluator>) -> Self {
        Expression {
            evaluator,
            args: RwLock::new(Vec::new()),
        }
    }

    pub fn add_arg(&self, source: Arc<Source>) {
        self.args.write().expect("expression args lock poisoned").push(source);
    }

    pub fn args(&self) -> Vec<Arc<Source>> {
        self.args.read().expect("expression args lock poisoned").clone()
    }

    pub fn name(&self) -> &str {
        self.evaluator.name()
    }

    /// Invoke the evaluator against the currently bound arguments.
    pub fn run(&self) -> Result<(), RuntimeError> {
        let args = self.args();
        self.evaluator.run(&args)
    }
}

/// Two `Expression`s are the same expression iff they're the same
/// allocation — identity, not structural equality. Sources and
/// expressions are associated by index/handle, never embedded by value.
pub fn same_expression(a: &Arc<Expression>, b: &Arc<Expression>) -> bool {
    Arc::ptr_eq(a, b)
}
