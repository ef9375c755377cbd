use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CoreError {
    #[error("chunk count must be positive (got {0})")]
    InvalidChunkCount(usize),

    #[error("files per partition must be positive (got {0})")]
    InvalidFilesPerPartition(usize),
}
