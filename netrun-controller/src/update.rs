use std::sync::Arc;
use std::time::SystemTime;

use netrun_bus::ToRule;
use netrun_core::{Source, SourceValue};

use crate::context::ControllerContext;
use crate::Controller;

/// Raw status as reported by a protocol adapter, before the base contract's
/// promotion rule is applied. `status_ok` is the adapter's own verdict;
/// `code` is a protocol-specific status string (`"Good"`, an OPC UA
/// `StatusCode` name, a Modbus exception mnemonic, ...) that
/// [`Controller::initial_promotion`] may inspect.
pub struct RawStatus<'a> {
    pub status_ok: bool,
    pub code: &'a str,
}

/// Shared `update_source_instance_value` helper every controller uses when
/// accepting a value from its external side. Wraps [`Source::observe`]
/// with the one controller-specific extension the base contract allows:
/// the "initial waiting" promotion.
pub fn update_source_instance_value(
    controller: &dyn Controller,
    source: &Source,
    value: SourceValue,
    stime: SystemTime,
    raw_status: RawStatus<'_>,
    oldnew_check: bool,
) -> bool {
    let mut status_ok = raw_status.status_ok;
    if !status_ok && source.status() == netrun_core::StatusCode::None && controller.initial_promotion(&raw_status) {
        status_ok = true;
    }
    source.observe(value, stime, status_ok, oldnew_check)
}

/// Send `RUN_EXPRESSION` to the rule that owns `source`. Adapters call
/// this after a successful [`update_source_instance_value`] when their
/// options say the change should be observable (`send_events_on_internal`
/// / `send_events_on_external` / `send_init_event`).
pub async fn fire_run_expression(ctx: &ControllerContext, source: &Arc<Source>) {
    if let Err(err) = ctx.bus.send_to_rule(source.rule(), ToRule::RunExpression(source.clone())).await {
        tracing::warn!(rule = source.rule(), reference = %source.reference(), error = %err, "failed to notify rule of source change");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ControllerContext, RuntimeResult};
    use async_trait::async_trait;
    use netrun_core::SourceValue;
    use std::sync::Arc;

    struct AlwaysPromote;

    #[async_trait]
    impl Controller for AlwaysPromote {
        fn name(&self) -> &str {
            "always-promote"
        }

        fn options(&self) -> &crate::ControllerOptions {
            static OPTS: std::sync::OnceLock<crate::ControllerOptions> = std::sync::OnceLock::new();
            OPTS.get_or_init(crate::ControllerOptions::default)
        }

        fn initial_promotion(&self, _raw_status: &RawStatus<'_>) -> bool {
            true
        }

        async fn handle_write_source(
            &self,
            _ctx: &ControllerContext,
            _source: Arc<Source>,
            _value: SourceValue,
            _stime: SystemTime,
        ) -> RuntimeResult<()> {
            Ok(())
        }
    }

    #[test]
    fn initial_waiting_promotion_arms_a_none_source_despite_bad_status() {
        let source = Source::new("tag1", "opcua1", "rule1", "Test");
        let controller = AlwaysPromote;
        let fired = update_source_instance_value(
            &controller,
            &source,
            SourceValue::Int(1),
            SystemTime::now(),
            RawStatus { status_ok: false, code: "Waiting" },
            false,
        );
        assert!(fired);
        assert_eq!(source.status(), netrun_core::StatusCode::Initial);
    }

    #[test]
    fn promotion_does_not_apply_once_the_source_has_left_none() {
        let source = Source::new("tag1", "opcua1", "rule1", "Test");
        let controller = AlwaysPromote;
        source.observe(SourceValue::Int(1), SystemTime::now(), true, false);

        let fired = update_source_instance_value(
            &controller,
            &source,
            SourceValue::Int(2),
            SystemTime::now(),
            RawStatus { status_ok: false, code: "Waiting" },
            false,
        );
        assert!(!fired);
        assert_eq!(source.status(), netrun_core::StatusCode::Invalid);
    }
}
