use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// Birth date missing or unparseable, lifespan not positive, or a
    /// settings field out of range.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// No timer facility to schedule ticks on (e.g. called outside a tokio runtime).
    #[error("timer unavailable: {0}")]
    TimerUnavailable(String),

    #[error("unsupported settings version {found} (expected {expected})")]
    UnsupportedVersion { found: u32, expected: u32 },

    #[error("failed to parse settings: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("settings I/O failed: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        Error::InvalidInput(msg.into())
    }
}
