//! Error types for trace rendering

/// Result type for errtrace operations
pub type Result<T> = std::result::Result<T, TraceError>;

/// Error types raised while rendering or writing a trace
#[derive(Debug, thiserror::Error)]
pub enum TraceError {
    /// A required argument was missing or an option value was malformed
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// The sink rejected the write
    #[error("IO failure: {0}")]
    IoFailure(#[from] std::io::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl TraceError {
    /// Shorthand for [`TraceError::InvalidArgument`]
    pub fn invalid(msg: impl Into<String>) -> Self {
        TraceError::InvalidArgument(msg.into())
    }

    /// Whether this error came from the sink
    pub fn is_io(&self) -> bool {
        matches!(self, TraceError::IoFailure(_))
    }
}

impl From<figment::Error> for TraceError {
    fn from(err: figment::Error) -> Self {
        TraceError::Configuration(format!("Failed to load configuration: {}", err))
    }
}
