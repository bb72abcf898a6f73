use crate::SourceReference;

/// The runtime's closed error taxonomy.
///
/// `Config` and `DuplicateSource` are setup-fatal: a caller that sees one of
/// these during startup should refuse to run rather than degrade. The rest
/// are recoverable — callers log them, bump a telemetry counter, and keep
/// going.
#[derive(Debug, thiserror::Error)]
pub enum RuntimeError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("duplicate source for reference `{0}`")]
    DuplicateSource(SourceReference),

    #[error("protocol error in controller `{controller}`: {message}")]
    Protocol { controller: String, message: String },

    #[error("expression evaluator failed: {0}")]
    Evaluator(String),

    #[error("message bus queue `{0}` is full")]
    BusFull(String),

    #[error("runtime interrupted")]
    Interrupted,
}

impl RuntimeError {
    /// Setup-fatal errors abort startup; everything else is logged and the
    /// owning worker keeps running.
    pub fn is_setup_fatal(&self) -> bool {
        matches!(self, RuntimeError::Config(_) | RuntimeError::DuplicateSource(_))
    }
}

pub type Result<T> = std::result::Result<T, RuntimeError>;
