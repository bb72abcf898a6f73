//! netrun — a facade crate re-exporting every sub-crate of the runtime
//! through a single dependency:
//!
//! ```ignore
//! use netrun::prelude::*;
//! ```

pub extern crate netrun_core;
pub extern crate netrun_bus;
pub extern crate netrun_registry;
pub extern crate netrun_telemetry;
pub extern crate netrun_controller;
pub extern crate netrun_rules;
pub extern crate netrun_internal;
pub extern crate netrun_config;

pub use netrun_core::*;

pub mod prelude {
    pub use netrun_bus::{Bus, BusError, ToController, ToRule};
    pub use netrun_config::{RuntimeConfig, SourceConfig};
    pub use netrun_controller::{
        fire_run_expression, update_source_instance_value, Controller, ControllerContext, ControllerOptions, RawStatus,
        RetryPolicy,
    };
    pub use netrun_core::{
        same_expression, DefaultInterface, Evaluator, Expression, Interface, Result, RuntimeError, SetCallback, Source,
        SourceClass, SourceClassArgs, SourceConstructor, SourceReference, SourceValue, StatusCode, Tick,
    };
    pub use netrun_internal::{dict_source_class, InternalController, DICT_SOURCE_TYPE};
    pub use netrun_registry::{ClassRegistry, SourceRegistry};
    pub use netrun_rules::{ExpressionInfo, RuleEngine, SourceInfo};
    pub use netrun_telemetry::Statistics;
}
