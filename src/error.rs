//! Error type shared by the benchmark library and binary.

use thiserror::Error;

/// Errors that can stop a benchmark run.
///
/// Affinity failures are deliberately absent: pinning is best-effort and a
/// thread that cannot be pinned simply runs wherever the scheduler puts it.
#[derive(Error, Debug)]
pub enum StreamError {
    /// One of the three arrays could not be allocated.
    #[error("failed to allocate {bytes} bytes for the stream arrays")]
    Allocation { bytes: usize },

    /// The cache topology table is unusable.
    #[error("invalid cache topology: {0}")]
    InvalidTopology(String),

    /// The benchmark configuration is out of range.
    #[error("invalid benchmark configuration: {0}")]
    InvalidConfig(String),

    /// The OS refused to create a worker thread.
    #[error("failed to spawn worker thread {thread}: {source}")]
    ThreadSpawn {
        thread: usize,
        #[source]
        source: std::io::Error,
    },

    /// A worker thread panicked before it could be joined cleanly.
    #[error("worker thread {thread} panicked")]
    WorkerPanicked { thread: usize },

    /// Report export failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result alias used across the crate.
pub type Result<T> = std::result::Result<T, StreamError>;
