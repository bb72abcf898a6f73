use std::fmt;
use std::sync::{Arc, OnceLock, RwLock};
use std::time::SystemTime;

use crate::{DefaultInterface, Interface, SourceReference, StatusCode, SourceValue};

/// Invoked when a rule mutates a source's value via [`Source::set`].
///
/// Per the design note on callback-driven mutation: this is an opaque
/// closure, not a handle to the Message Bus itself. `netrun-rules` installs
/// one per source at setup time that turns the call into a `WRITE_SOURCE`
/// message on the owning controller's queue — `Source` never needs to know
/// the bus exists.
pub type SetCallback = Arc<dyn Fn(SourceValue) + Send + Sync>;

#[derive(Debug, Clone)]
struct SourceState {
    value: SourceValue,
    source_time: SystemTime,
    status_code: StatusCode,
}

impl Default for SourceState {
    fn default() -> Self {
        SourceState {
            value: SourceValue::Unset,
            source_time: SystemTime::UNIX_EPOCH,
            status_code: StatusCode::None,
        }
    }
}

/// A single external data point: a tag-like value backed by a protocol
/// adapter.
///
/// `key`, `reference`, `controller` and `rule` are fixed at construction and
/// never change afterwards. `value` / `source_time` / `status_code` are
/// mutated through [`Source::observe`], which only the owning controller
/// is expected to call in steady state.
pub struct Source {
    key: String,
    reference: SourceReference,
    controller: String,
    rule: String,
    source_type: &'static str,
    interface: Arc<dyn Interface>,
    display_name: Option<String>,
    unit: Option<String>,
    state: RwLock<SourceState>,
    set_callback: OnceLock<SetCallback>,
}

impl fmt::Debug for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.read().expect("source state lock poisoned");
        f.debug_struct("Source")
            .field("reference", &self.reference)
            .field("controller", &self.controller)
            .field("rule", &self.rule)
            .field("status_code", &state.status_code)
            .field("value", &state.value)
            .finish()
    }
}

impl Source {
    pub fn new(
        key: impl Into<String>,
        controller: impl Into<String>,
        rule: impl Into<String>,
        source_type: &'static str,
    ) -> Self {
        Self::with_interface(key, controller, rule, source_type, Arc::new(DefaultInterface))
    }

    pub fn with_interface(
        key: impl Into<String>,
        controller: impl Into<String>,
        rule: impl Into<String>,
        source_type: &'static str,
        interface: Arc<dyn Interface>,
    ) -> Self {
        let key = key.into();
        let controller = controller.into();
        let rule = rule.into();
        let reference = SourceReference::new(&controller, source_type, &key);
        Source {
            key,
            reference,
            controller,
            rule,
            source_type,
            interface,
            display_name: None,
            unit: None,
            state: RwLock::new(SourceState::default()),
            set_callback: OnceLock::new(),
        }
    }

    pub fn with_metadata(mut self, display_name: Option<String>, unit: Option<String>) -> Self {
        self.display_name = display_name;
        self.unit = unit;
        self
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn reference(&self) -> &SourceReference {
        &self.reference
    }

    pub fn controller(&self) -> &str {
        &self.controller
    }

    pub fn rule(&self) -> &str {
        &self.rule
    }

    pub fn source_type(&self) -> &'static str {
        self.source_type
    }

    pub fn display_name(&self) -> Option<&str> {
        self.display_name.as_deref()
    }

    pub fn unit(&self) -> Option<&str> {
        self.unit.as_deref()
    }

    pub fn value(&self) -> SourceValue {
        self.state.read().expect("source state lock poisoned").value.clone()
    }

    pub fn source_time(&self) -> SystemTime {
        self.state.read().expect("source state lock poisoned").source_time
    }

    pub fn status(&self) -> StatusCode {
        self.state.read().expect("source state lock poisoned").status_code
    }

    /// Install the callback invoked by [`Source::set`]. Only the first
    /// installation sticks — sources are only ever bound to one owning
    /// rule's write path (setup time, before the controller sees them).
    pub fn install_set_callback(&self, callback: SetCallback) {
        if self.set_callback.set(callback).is_err() {
            tracing::warn!(reference = %self.reference, "set_callback already installed, ignoring");
        }
    }

    /// Entry point for rule-driven writes: an expression calls this on one
    /// of its bound source arguments. Turns into a `WRITE_SOURCE` message on
    /// the owning controller's queue via the installed callback.
    pub fn set(&self, value: SourceValue) {
        match self.set_callback.get() {
            Some(cb) => cb(value),
            None => tracing::warn!(reference = %self.reference, "set() called before a set_callback was installed"),
        }
    }

    /// Core status state machine underlying every controller's
    /// `update_source_instance_value`.
    ///
    /// Returns `true` exactly when the update should fire a `RUN_EXPRESSION`
    /// — i.e. a good observation that changed the value or moved status out
    /// of `None`/`Invalid`. Bad observations never fire, even when they do
    /// change status (`None -> None` or `Invalid -> Invalid` do not count as
    /// "changing" for suppression purposes, but still never fire).
    ///
    /// `status_ok` and `oldnew_check` are supplied by the calling
    /// controller; the OPC UA "initial waiting" promotion is implemented
    /// by the controller flipping `status_ok` to `true` before calling
    /// this, based on [`Source::status`] == `None`.
    pub fn observe(&self, value: SourceValue, stime: SystemTime, status_ok: bool, oldnew_check: bool) -> bool {
        let mut state = self.state.write().expect("source state lock poisoned");
        let prev_value = state.value.clone();
        let prev_status = state.status_code;

        if status_ok {
            if oldnew_check && prev_status.is_good() && self.interface.values_equal(&prev_value, &value) {
                return false;
            }
            state.value = value;
            state.source_time = stime;
            state.status_code = if prev_status == StatusCode::None {
                StatusCode::Initial
            } else {
                StatusCode::Good
            };
            true
        } else {
            if oldnew_check && prev_status == StatusCode::Invalid && self.interface.values_equal(&prev_value, &value) {
                return false;
            }
            state.value = value;
            state.source_time = stime;
            if prev_status != StatusCode::None {
                state.status_code = StatusCode::Invalid;
            }
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn src() -> Source {
        Source::new("tag1", "plc1", "rule1", "TestSource")
    }

    #[test]
    fn good_observation_from_none_goes_initial_and_fires() {
        let s = src();
        let fired = s.observe(SourceValue::Int(1), SystemTime::now(), true, false);
        assert!(fired);
        assert_eq!(s.status(), StatusCode::Initial);
        assert_eq!(s.value(), SourceValue::Int(1));
    }

    #[test]
    fn bad_observation_from_none_stays_none_and_never_fires() {
        let s = src();
        let fired = s.observe(SourceValue::Int(0), SystemTime::now(), false, false);
        assert!(!fired);
        assert_eq!(s.status(), StatusCode::None);
    }

    #[test]
    fn second_good_observation_with_a_new_value_moves_initial_to_good() {
        let s = src();
        s.observe(SourceValue::Int(1), SystemTime::now(), true, true);
        let fired = s.observe(SourceValue::Int(2), SystemTime::now(), true, true);
        assert!(fired);
        assert_eq!(s.status(), StatusCode::Good);
    }

    #[test]
    fn identical_value_while_initial_is_suppressed_and_status_stays_initial() {
        let s = src();
        s.observe(SourceValue::Int(1), SystemTime::now(), true, true);
        let fired = s.observe(SourceValue::Int(1), SystemTime::now(), true, true);
        assert!(!fired, "equal value while status is already Initial or Good must be suppressed");
        assert_eq!(s.status(), StatusCode::Initial);
    }

    #[test]
    fn identical_good_observation_is_suppressed_once_settled_in_good() {
        let s = src();
        s.observe(SourceValue::Int(1), SystemTime::now(), true, true);
        s.observe(SourceValue::Int(2), SystemTime::now(), true, true);
        let fired = s.observe(SourceValue::Int(2), SystemTime::now(), true, true);
        assert!(!fired);
        assert_eq!(s.status(), StatusCode::Good);
    }

    #[test]
    fn bad_observation_from_good_goes_invalid_and_never_fires() {
        let s = src();
        s.observe(SourceValue::Int(1), SystemTime::now(), true, false);
        let fired = s.observe(SourceValue::Int(1), SystemTime::now(), false, false);
        assert!(!fired);
        assert_eq!(s.status(), StatusCode::Invalid);
    }

    #[test]
    fn repeated_identical_bad_observation_is_suppressed_while_invalid() {
        let s = src();
        s.observe(SourceValue::Int(1), SystemTime::now(), true, false);
        s.observe(SourceValue::Int(2), SystemTime::now(), false, true);
        let before = s.source_time();
        std::thread::sleep(std::time::Duration::from_millis(1));
        s.observe(SourceValue::Int(2), SystemTime::now(), false, true);
        assert_eq!(s.source_time(), before, "suppressed observation must not touch source_time");
    }

    #[test]
    fn set_without_callback_does_not_panic() {
        let s = src();
        s.set(SourceValue::Bool(true));
    }

    #[test]
    fn set_invokes_installed_callback() {
        let s = src();
        let seen = Arc::new(std::sync::Mutex::new(None));
        let seen2 = seen.clone();
        s.install_set_callback(Arc::new(move |v| *seen2.lock().unwrap() = Some(v)));
        s.set(SourceValue::Int(7));
        assert_eq!(*seen.lock().unwrap(), Some(SourceValue::Int(7)));
    }
}
