// Implement the StorageClient trait for the s3::Client
#![forbid(unsafe_code)]
#![deny(missing_docs)]
use anyhow::Result;
use async_trait::async_trait;
use crate::common::{
    Buckets,
    ObjectPage,
    StorageClient,
};
use super::client::Client;
use tracing::debug;

#[async_trait]
impl StorageClient for Client {
    /// Return `Buckets` discovered in S3.
    ///
    /// Buckets are global, so this is the same whichever region the client
    /// is in.
    async fn list_buckets(&self) -> Result<Buckets> {
        debug!("buckets: Listing from '{}'...", self.region);

        Client::list_buckets(self).await
    }

    /// Return the region of `bucket`.
    async fn bucket_region(&self, bucket: &str) -> Result<String> {
        self.get_bucket_location(bucket).await
    }

    /// Return one page of the object listing of `bucket`.
    ///
    /// This must be called on a client in the bucket's own region.
    async fn list_objects(
        &self,
        bucket: &str,
        token: Option<String>,
    ) -> Result<ObjectPage> {
        debug!(
            "list_objects: '{}' in '{}' from {:?}",
            bucket,
            self.region,
            token,
        );

        self.list_objects_page(bucket, token).await
    }
}
