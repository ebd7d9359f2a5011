// StorageClient and ClientFactory traits
#![forbid(unsafe_code)]
#![deny(missing_docs)]
use anyhow::Result;
use async_trait::async_trait;
use chrono::{
    DateTime,
    Utc,
};
use super::Buckets;

/// Storage class assumed for objects that don't report one.
pub const DEFAULT_STORAGE_CLASS: &str = "STANDARD";

/// Number of objects requested per listing page.
pub const OBJECT_PAGE_SIZE: i32 = 1000;

/// The parts of a listed object that bucket metrics are built from.
#[derive(Clone, Debug, PartialEq)]
pub struct ObjectRecord {
    /// Object size in bytes.
    pub size_bytes: u64,

    /// When the object was last modified.
    pub last_modified: Option<DateTime<Utc>>,

    /// Storage class label, eg. `STANDARD` or `GLACIER`.
    pub storage_class: String,
}

/// One page of an object listing.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ObjectPage {
    /// Objects on this page.
    pub objects: Vec<ObjectRecord>,

    /// Continuation token for the next page, `None` on the last page.
    pub next_token: Option<String>,
}

/// `StorageClient` represents the calls the enrichment pipeline makes against
/// the object storage service.
///
/// This trait should be implemented by all `Client`s performing these tasks.
#[async_trait]
pub trait StorageClient: Send + Sync {
    /// Returns every bucket in the account with its name and creation date.
    async fn list_buckets(&self) -> Result<Buckets>;

    /// Returns the name of the region that `bucket` lives in.
    async fn bucket_region(&self, bucket: &str) -> Result<String>;

    /// Returns one page of the object listing for `bucket`, starting at
    /// `token` if given.
    async fn list_objects(
        &self,
        bucket: &str,
        token: Option<String>,
    ) -> Result<ObjectPage>;
}

/// Creates region scoped `StorageClient`s.
#[async_trait]
pub trait ClientFactory: Send + Sync {
    /// The client type this factory creates.
    type Client: StorageClient + 'static;

    /// Create a new client for `region`.
    async fn create(&self, region: &str) -> Result<Self::Client>;
}
