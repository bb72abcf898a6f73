//! The Message Bus: named, bounded queues connecting controllers and
//! rules. Producers enqueue with backpressure; consumers
//! dequeue with a bounded wait so their run loops can periodically check
//! a cancellation signal instead of blocking forever.

mod bus;
mod error;
mod message;

pub use bus::{recv_timeout, Bus, DEFAULT_QUEUE_CAPACITY};
pub use error::BusError;
pub use message::{ToController, ToRule};
