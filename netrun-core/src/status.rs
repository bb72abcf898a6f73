/// A source's lifecycle state.
///
/// `None` means "no value has ever been observed" — it is not the same as
/// `Invalid`, which means "we've observed something, but the last
/// observation was bad". Transitions are driven exclusively by
/// [`crate::Source::observe`]; see its doc comment for the full table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum StatusCode {
    None,
    Initial,
    Good,
    Invalid,
}

impl Default for StatusCode {
    fn default() -> Self {
        StatusCode::None
    }
}

impl StatusCode {
    /// Whether a source in this status carries a value a rule can trust.
    pub fn is_good(self) -> bool {
        matches!(self, StatusCode::Initial | StatusCode::Good)
    }
}
