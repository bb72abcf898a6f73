//! Core data model for netrun: sources, their status state machine,
//! expressions, ticks, and the shared error taxonomy.
//!
//! This crate has no knowledge of the Message Bus, the Source Registry, or
//! any particular controller/rule implementation — it only defines the
//! shapes those components pass around. See `netrun-bus`, `netrun-registry`,
//! `netrun-controller` and `netrun-rules` for the coordination layer built
//! on top of it.

mod error;
mod expression;
mod reference;
mod source;
mod source_class;
mod status;
mod tick;
mod value;

pub use error::{Result, RuntimeError};
pub use expression::{same_expression, Evaluator, Expression};
pub use reference::SourceReference;
pub use source::{SetCallback, Source};
pub use source_class::{SourceClass, SourceClassArgs, SourceConstructor};
pub use status::StatusCode;
pub use tick::Tick;
pub use value::{DefaultInterface, Interface, SourceValue};
