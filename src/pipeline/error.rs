// Fatal pipeline errors
#![forbid(unsafe_code)]
#![deny(missing_docs)]
use thiserror::Error;

/// Errors that abort a whole pipeline run.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// The pool was asked to run with no workers.
    #[error("'{0}' is not a valid worker count, it must be at least 1")]
    InvalidWorkerCount(usize),

    /// A worker task panicked, losing the bucket it was enriching.
    #[error("an enrichment worker failed: {0}")]
    WorkerPanicked(String),
}
