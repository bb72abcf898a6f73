use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::SystemTime;

use async_trait::async_trait;
use netrun_controller::{
    fire_run_expression, update_source_instance_value, Controller, ControllerContext, ControllerOptions, RawStatus,
    RuntimeResult,
};
use netrun_core::{Source, SourceValue};

/// The reference controller: a purely in-process adapter with no
/// external protocol at all. `WRITE_SOURCE` is applied directly to the
/// source itself rather than to any external system — this is the
/// sanity-check adapter other controllers are expected to follow.
pub struct InternalController {
    name: String,
    options: ControllerOptions,
}

impl InternalController {
    pub fn new(name: impl Into<String>, options: ControllerOptions) -> Self {
        InternalController { name: name.into(), options }
    }
}

#[async_trait]
impl Controller for InternalController {
    fn name(&self) -> &str {
        &self.name
    }

    fn options(&self) -> &ControllerOptions {
        &self.options
    }

    async fn handle_add_source(&self, ctx: &ControllerContext, source: Arc<Source>) -> RuntimeResult<()> {
        ctx.registry.add(source.clone())?;

        // Arm the source with an empty value unless it's already expected
        // to announce itself via send_events, and always do so (plus
        // notify) when send_init_event is set.
        if !self.options.send_events_on_internal || self.options.send_init_event {
            source.observe(SourceValue::Struct(BTreeMap::new()), SystemTime::now(), true, false);
        }
        if self.options.send_init_event {
            fire_run_expression(ctx, &source).await;
        }
        Ok(())
    }

    async fn handle_write_source(
        &self,
        ctx: &ControllerContext,
        source: Arc<Source>,
        value: SourceValue,
        stime: SystemTime,
    ) -> RuntimeResult<()> {
        let fired = update_source_instance_value(
            self,
            &source,
            value,
            stime,
            RawStatus { status_ok: true, code: "Good" },
            self.options.oldnew_comparision,
        );
        if fired && self.options.send_events_on_internal {
            fire_run_expression(ctx, &source).await;
        }
        Ok(())
    }
}
