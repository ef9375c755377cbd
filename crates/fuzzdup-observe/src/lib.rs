//! Logging setup for pipeline stage binaries.
//!
//! Libraries in the workspace only emit `tracing` events; a stage binary calls
//! [`init_logger`] once at start-up to decide where those events go.

mod config;
pub use config::{LogFormat, LoggerConfig};

mod error;
pub use error::LoggerError;

mod install;
pub use install::init_logger;
