use std::sync::Arc;
use std::time::SystemTime;

use async_trait::async_trait;
use netrun_core::{RuntimeError, Source, SourceClass, SourceValue, Tick};

use crate::context::ControllerContext;
use crate::options::ControllerOptions;
use crate::update::RawStatus;

pub type RuntimeResult<T> = Result<T, RuntimeError>;

/// A worker owning one protocol adapter's source lifecycle.
///
/// Default method bodies implement a minimal base contract; a concrete
/// adapter overrides only what its protocol actually needs —
/// `handle_write_source` is the one hook every adapter must supply, since
/// "apply the value to the external protocol" has no sensible default.
#[async_trait]
pub trait Controller: Send + Sync {
    fn name(&self) -> &str;

    fn options(&self) -> &ControllerOptions;

    /// Opt-in OPC UA-style "initial waiting" promotion. Default: never
    /// promote a bad observation.
    fn initial_promotion(&self, _raw_status: &RawStatus<'_>) -> bool {
        false
    }

    /// Protocol-specific connect/listen setup, wrapped by the base loop in
    /// a [`crate::RetryPolicy`].
    async fn connect(&self, _ctx: &ControllerContext) -> RuntimeResult<()> {
        Ok(())
    }

    /// Protocol-specific teardown, run once on shutdown.
    async fn teardown(&self, _ctx: &ControllerContext) {}

    /// `ADD_SOURCE`: adopt the source into the registry. The default is
    /// exactly the base contract's minimum ("add to the registry"); an
    /// adapter that needs to set an initial value/status before the
    /// source is visible overrides this.
    async fn handle_add_source(&self, ctx: &ControllerContext, source: Arc<Source>) -> RuntimeResult<()> {
        ctx.registry.add(source)
    }

    /// `ADD_PARSER`: register a source class for later protocol decoding.
    async fn handle_add_parser(&self, ctx: &ControllerContext, class: SourceClass) -> RuntimeResult<()> {
        ctx.classes.register(class)
    }

    /// `WRITE_SOURCE`: apply a rule-driven write to the external protocol
    /// (or, for a purely internal controller, to the source itself).
    /// Required: every adapter's external side is different.
    async fn handle_write_source(
        &self,
        ctx: &ControllerContext,
        source: Arc<Source>,
        value: SourceValue,
        stime: SystemTime,
    ) -> RuntimeResult<()>;

    /// `READ_SOURCE`: request a refresh of a single source.
    /// Implementation-defined; default is a no-op for controllers that
    /// only push (never pull).
    async fn handle_read_source(&self, _ctx: &ControllerContext, _source: Arc<Source>) -> RuntimeResult<()> {
        Ok(())
    }

    /// `READ_ALL`: request a refresh of every adopted source.
    async fn handle_read_all(&self, _ctx: &ControllerContext) -> RuntimeResult<()> {
        Ok(())
    }

    /// `TICK`: record the round trip.
    async fn handle_tick(&self, _ctx: &ControllerContext, tick: Arc<Tick>) {
        tick.record();
    }
}
