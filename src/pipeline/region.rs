// RegionResolver
#![forbid(unsafe_code)]
#![deny(missing_docs)]
use crate::common::{
    with_timeout,
    EnrichError,
    StorageClient,
};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Finds a bucket's home region using the default region's client.
///
/// Location lookups work from any region, so a single client serves every
/// bucket.
pub struct RegionResolver<C: StorageClient> {
    client:  Arc<C>,
    timeout: Duration,
}

impl<C: StorageClient> RegionResolver<C> {
    /// Return a new `RegionResolver` using `client`.
    pub fn new(client: Arc<C>, timeout: Duration) -> Self {
        Self {
            client:  client,
            timeout: timeout,
        }
    }

    /// Return the region `bucket` lives in.
    pub async fn resolve(&self, bucket: &str) -> Result<String, EnrichError> {
        debug!("resolve: Retrieving location for '{}'", bucket);

        let region = with_timeout(self.timeout, self.client.bucket_region(bucket))
            .await
            .map_err(|e| EnrichError::RegionLookup(format!("{:#}", e)))?;

        debug!("resolve: '{}' is in '{}'", bucket, region);

        Ok(region)
    }
}
