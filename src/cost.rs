// Imports all of the components needed for cost collection
#![forbid(unsafe_code)]
#![deny(missing_docs)]

/// Cost Explorer `Client`.
#[cfg(feature = "cost")]
mod client;

/// `CostCollector` and the `CostService` trait it queries.
mod collector;

#[cfg(feature = "cost")]
pub use client::*;
pub use collector::*;
