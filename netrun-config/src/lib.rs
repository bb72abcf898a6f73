//! Runtime configuration: the two top-level dictionaries every deployment
//! needs (`controllers`, `controller_aliases`), per-controller option
//! overrides, and per-source declarations. Loaded from TOML via `serde`.

use std::collections::BTreeMap;
use std::path::Path;

use netrun_core::{RuntimeError, SourceValue};
use serde::Deserialize;

/// Controller-level options recognized by the base contract. Every field
/// is optional here so a config file only needs to override
/// what it cares about; [`netrun_controller::ControllerOptions::default`]
/// fills in the rest.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ControllerOptionsConfig {
    pub send_events_on_internal: Option<bool>,
    pub send_events_on_external: Option<bool>,
    pub oldnew_comparision: Option<bool>,
    pub send_init_event: Option<bool>,
}

/// One source declaration read from configuration. `rule` may be `"*"`,
/// meaning "any rule that declares an expression over this key".
#[derive(Debug, Clone, Deserialize)]
pub struct SourceConfig {
    #[serde(rename = "type")]
    pub source_type: String,
    pub controller: String,
    #[serde(default = "default_rule")]
    pub rule: String,
    #[serde(default)]
    pub default_value: SourceValue,
}

fn default_rule() -> String {
    "*".to_string()
}

/// Top-level runtime configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RuntimeConfig {
    /// `name -> enabled`.
    #[serde(default)]
    pub controllers: BTreeMap<String, bool>,
    /// `alias -> origin controller name`.
    #[serde(default)]
    pub controller_aliases: BTreeMap<String, String>,
    /// `controller name -> option overrides`.
    #[serde(default)]
    pub controller_options: BTreeMap<String, ControllerOptionsConfig>,
    /// `key -> source declaration`, keyed the way expressions reference
    /// them in their argument lists.
    #[serde(default)]
    pub sources: BTreeMap<String, SourceConfig>,
}

impl RuntimeConfig {
    pub fn from_toml_str(text: &str) -> Result<Self, RuntimeError> {
        toml::from_str(text).map_err(|err| RuntimeError::Config(format!("invalid configuration: {err}")))
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, RuntimeError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|err| RuntimeError::Config(format!("reading {}: {err}", path.display())))?;
        Self::from_toml_str(&text)
    }

    /// The set of controller names actually enabled, aliases resolved to
    /// their origin.
    pub fn enabled_controllers(&self) -> Vec<String> {
        self.controllers
            .iter()
            .filter(|(_, enabled)| **enabled)
            .map(|(name, _)| self.resolve_alias(name).to_string())
            .collect()
    }

    pub fn resolve_alias<'a>(&'a self, name: &'a str) -> &'a str {
        self.controller_aliases.get(name).map(|s| s.as_str()).unwrap_or(name)
    }

    /// Setup-fatal validation: a source whose controller can't be
    /// resolved is a configuration error, not a runtime one. Checks every
    /// source references a controller that is declared (enabled or not —
    /// declaring it disabled is a deliberate choice, referencing one not
    /// declared at all is a typo).
    pub fn validate(&self) -> Result<(), RuntimeError> {
        for (key, source) in &self.sources {
            let resolved = self.resolve_alias(&source.controller);
            if !self.controllers.contains_key(resolved) {
                return Err(RuntimeError::Config(format!(
                    "source `{key}` references unknown controller `{}`",
                    source.controller
                )));
            }
        }
        for (alias, origin) in &self.controller_aliases {
            if !self.controllers.contains_key(origin) {
                return Err(RuntimeError::Config(format!(
                    "controller alias `{alias}` points to unknown controller `{origin}`"
                )));
            }
        }
        Ok(())
    }
}
