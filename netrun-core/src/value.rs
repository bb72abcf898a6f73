use std::collections::BTreeMap;
use std::fmt;

/// The closed set of value shapes a `Source` can carry.
///
/// Protocol adapters coerce whatever the wire format gives them (a Modbus
/// register, an OPC UA variant, ...) into one of these before handing it to
/// [`crate::Source::observe`]. `Struct` covers compound tags (e.g. an OPC UA
/// object node flattened to named fields).
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(untagged)]
pub enum SourceValue {
    Unset,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    Struct(BTreeMap<String, SourceValue>),
}

impl Default for SourceValue {
    fn default() -> Self {
        SourceValue::Unset
    }
}

impl fmt::Display for SourceValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceValue::Unset => write!(f, "<unset>"),
            SourceValue::Bool(b) => write!(f, "{b}"),
            SourceValue::Int(i) => write!(f, "{i}"),
            SourceValue::Float(v) => write!(f, "{v}"),
            SourceValue::Text(s) => write!(f, "{s}"),
            SourceValue::Struct(map) => write!(f, "{map:?}"),
        }
    }
}

/// Describes how to compare and coerce a source's value.
///
/// Old/new suppression compares by value according to the source's
/// interface — structured values need a well-defined deep equality,
/// which is exactly what implementors of this trait supply.
/// `DefaultInterface` uses `SourceValue`'s derived structural equality;
/// protocol-specific interfaces (e.g. one that treats floats within an
/// epsilon as equal) can override `values_equal`.
pub trait Interface: Send + Sync + fmt::Debug {
    /// Stable name used in diagnostics and statistics keys.
    fn name(&self) -> &'static str;

    /// Deep equality used by old/new suppression.
    fn values_equal(&self, a: &SourceValue, b: &SourceValue) -> bool {
        a == b
    }
}

/// The interface used by sources that don't need anything special: plain
/// structural equality over [`SourceValue`].
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultInterface;

impl Interface for DefaultInterface {
    fn name(&self) -> &'static str {
        "default"
    }
}
