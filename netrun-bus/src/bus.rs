use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use tokio::sync::mpsc;

use crate::error::BusError;
use crate::message::{ToController, ToRule};

/// Queue depth used for every registered channel unless a caller asks for
/// something else — large enough to absorb a tick burst without a
/// producer blocking on a merely-busy consumer.
pub const DEFAULT_QUEUE_CAPACITY: usize = 256;

/// Named, bounded point-to-point queues connecting rules and controllers.
///
/// Every controller and every rule registers exactly one queue here at
/// startup and keeps the `Receiver` it gets back for its own run loop —
/// the bus itself only ever holds senders, so handing a message to a
/// queue can never race with the consumer draining it. Cloning a `Bus`
/// is cheap and shares the same underlying queues, letting every
/// subscriber-side task hold its own handle to the same dispatch table.
#[derive(Clone)]
pub struct Bus {
    capacity: usize,
    controllers: Arc<DashMap<String, mpsc::Sender<ToController>>>,
    rules: Arc<DashMap<String, mpsc::Sender<ToRule>>>,
}

impl Bus {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_QUEUE_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Bus {
            capacity,
            controllers: Arc::new(DashMap::new()),
            rules: Arc::new(DashMap::new()),
        }
    }

    /// Register a controller's incoming queue, returning the receiver end
    /// for that controller's run loop to drain. Re-registering the same
    /// name replaces the old sender — any message already enqueued on the
    /// old channel is still delivered to whoever is still holding its
    /// receiver, but new `send_to_controller` calls resolve to the new one.
    pub fn register_controller(&self, name: impl Into<String>) -> mpsc::Receiver<ToController> {
        let (tx, rx) = mpsc::channel(self.capacity);
        self.controllers.insert(name.into(), tx);
        rx
    }

    /// Register a rule's incoming queue, returning the receiver end for
    /// that rule's run loop to drain.
    pub fn register_rule(&self, name: impl Into<String>) -> mpsc::Receiver<ToRule> {
        let (tx, rx) = mpsc::channel(self.capacity);
        self.rules.insert(name.into(), tx);
        rx
    }

    /// Enqueue a message for a controller. Resolves once there is room in
    /// the queue — a full queue applies backpressure to the sender rather
    /// than dropping anything; the bus never silently drops a message.
    pub async fn send_to_controller(&self, name: &str, message: ToController) -> Result<(), BusError> {
        let sender = self
            .controllers
            .get(name)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| BusError::UnknownController(name.to_string()))?;
        sender
            .send(message)
            .await
            .map_err(|_| BusError::Closed(name.to_string()))
    }

    /// Enqueue a message for a rule.
    pub async fn send_to_rule(&self, name: &str, message: ToRule) -> Result<(), BusError> {
        let sender = self
            .rules
            .get(name)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| BusError::UnknownRule(name.to_string()))?;
        sender
            .send(message)
            .await
            .map_err(|_| BusError::Closed(name.to_string()))
    }

    pub fn known_controllers(&self) -> Vec<String> {
        self.controllers.iter().map(|e| e.key().clone()).collect()
    }

    pub fn known_rules(&self) -> Vec<String> {
        self.rules.iter().map(|e| e.key().clone()).collect()
    }
}

impl Default for Bus {
    fn default() -> Self {
        Self::new()
    }
}

/// Bounded-wait dequeue: waits up to `timeout` for the next message, then
/// gives the caller a chance to check its shutdown signal instead of
/// blocking forever. Returns `None` both on timeout and once the channel
/// is closed, since a run loop reacts to either the same way: go check
/// whether it should keep running.
pub async fn recv_timeout<T>(rx: &mut mpsc::Receiver<T>, timeout: Duration) -> Option<T> {
    tokio::time::timeout(timeout, rx.recv()).await.ok().flatten()
}
