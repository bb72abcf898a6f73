//! The base controller contract: the `Controller` trait, shared
//! `ControllerContext`, the old/new suppression helper, and the base run
//! loop every concrete protocol adapter is driven by.

mod context;
mod controller;
mod options;
mod retry;
mod runner;
mod update;

pub use context::ControllerContext;
pub use controller::{Controller, RuntimeResult};
pub use options::ControllerOptions;
pub use retry::RetryPolicy;
pub use runner::{run_controller, DEFAULT_DEQUEUE_TIMEOUT};
pub use update::{fire_run_expression, update_source_instance_value, RawStatus};
