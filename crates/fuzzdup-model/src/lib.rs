//! Configuration surface shared by every stage of the fuzzy-deduplication pipeline.
//!
//! Stages flatten [`PipelineArgs`] into their own `clap` parser and turn it into an
//! immutable, validated [`PipelineConfig`] once at process start.

mod error;
pub use error::ConfigError;

mod protocol;
pub use protocol::Protocol;

mod size;
pub use size::ByteSize;

mod config;
pub use config::{ClusterSource, DEFAULT_ABOUT, PipelineArgs, PipelineConfig};
