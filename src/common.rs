// Common traits and types
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod bucket;
mod client_config;
mod deadline;
mod error;
mod filter;
mod human_size;
mod region;
mod size_unit;
mod sort;
mod storage_client;

pub use bucket::*;
pub use client_config::*;
pub use deadline::*;
pub use error::*;
pub use filter::*;
pub use human_size::*;
pub use region::*;
pub use size_unit::*;
pub use sort::*;
pub use storage_client::*;
