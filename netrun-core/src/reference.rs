use std::fmt;

/// Canonical identity of a source: `controller:source_type:key`.
///
/// Two sources with the same reference denote the same point even if they
/// were constructed independently — this is what the Source Registry
/// deduplicates on.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
pub struct SourceReference(String);

impl SourceReference {
    pub fn new(controller: &str, source_type: &str, key: &str) -> Self {
        SourceReference(format!("{controller}:{source_type}:{key}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SourceReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<SourceReference> for String {
    fn from(r: SourceReference) -> Self {
        r.0
    }
}
