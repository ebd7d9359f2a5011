// Concurrent bucket enrichment pipeline
#![forbid(unsafe_code)]
#![deny(missing_docs)]

/// Fatal pipeline errors.
mod error;

/// Object metrics aggregation.
mod metrics;

/// Per-bucket outcomes and their accumulation.
mod outcome;

/// The worker pool and per-bucket stage sequence.
mod pool;

/// Bucket region lookups.
mod region;

/// Lazily created region scoped clients.
mod registry;

pub use error::*;
pub use metrics::*;
pub use outcome::*;
pub use pool::*;
pub use region::*;
pub use registry::*;
