use thiserror::Error;

#[derive(Debug, Error)]
pub enum LoggerError {
    #[error("unknown log format '{0}' (expected text|json|journald)")]
    UnknownFormat(String),

    #[error("journald logging needs Linux and the `journald` feature")]
    JournaldUnavailable,

    #[error("a global tracing subscriber is already installed")]
    AlreadyInstalled,

    #[error("invalid log filter '{filter}': {reason}")]
    InvalidFilter { filter: String, reason: String },

    #[error("failed to install logger: {0}")]
    Install(String),
}
