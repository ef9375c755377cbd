use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    /// Parse failure reported by clap; already carries the usage message.
    #[error(transparent)]
    Parse(#[from] clap::Error),

    #[error("invalid value for '--{arg}': {reason}")]
    InvalidValue { arg: &'static str, reason: String },

    #[error("conflicting arguments: {0}")]
    Conflict(String),
}

impl ConfigError {
    /// Convert into a clap error rendered against `cmd`, so the usage line is printed.
    pub fn with_usage(self, cmd: &mut clap::Command) -> clap::Error {
        use clap::error::ErrorKind;

        match self {
            ConfigError::Parse(e) => e,
            e @ ConfigError::InvalidValue { .. } => cmd.error(ErrorKind::ValueValidation, e),
            e @ ConfigError::Conflict(_) => cmd.error(ErrorKind::ArgumentConflict, e),
        }
    }

    /// Print the error with `cmd`'s usage and terminate the process with clap's
    /// exit status.
    pub fn exit(self, cmd: &mut clap::Command) -> ! {
        self.with_usage(cmd).exit()
    }
}
