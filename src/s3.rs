// Imports all of the components needed for s3::client
#![forbid(unsafe_code)]
#![deny(missing_docs)]

/// S3 `Client`.
mod client;

/// `Factory` creating region scoped S3 `Client`s.
mod factory;

/// Implementation of the `StorageClient` trait for our S3 `Client`.
mod storage_client;

pub use factory::*;
