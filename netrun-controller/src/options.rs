/// Controller-level options recognized by every adapter.
///
/// Per-protocol options (endpoints, credentials, address maps, ...) live on
/// the concrete controller itself; this only covers the flags the base
/// contract interprets directly.
#[derive(Debug, Clone, serde::Deserialize)]
#[serde(default)]
pub struct ControllerOptions {
    /// Fire `RUN_EXPRESSION` for value changes driven by `WRITE_SOURCE`
    /// (a rule writing back through this controller).
    pub send_events_on_internal: bool,
    /// Fire `RUN_EXPRESSION` for value changes observed from the external
    /// protocol side.
    pub send_events_on_external: bool,
    /// Enable old/new suppression on incoming values.
    pub oldnew_comparision: bool,
    /// On `ADD_SOURCE`, emit an initial `RUN_EXPRESSION` once the source
    /// has a value.
    pub send_init_event: bool,
}

impl Default for ControllerOptions {
    fn default() -> Self {
        ControllerOptions {
            send_events_on_internal: true,
            send_events_on_external: true,
            oldnew_comparision: true,
            send_init_event: false,
        }
    }
}
