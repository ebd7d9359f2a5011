// MetricsCollector: object count, size, last modified and storage classes
#![forbid(unsafe_code)]
#![deny(missing_docs)]
use anyhow::Context;
use chrono::{
    DateTime,
    Utc,
};
use crate::common::{
    with_timeout,
    Bucket,
    EnrichError,
    ObjectRecord,
    StorageClasses,
    StorageClient,
};
use std::collections::BTreeMap;
use std::time::Duration;
use tracing::debug;

/// Aggregate object metrics for a single bucket.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct BucketMetrics {
    /// Number of objects.
    pub object_count: u64,

    /// Sum of object sizes in bytes.
    pub size_bytes: u64,

    /// Most recent object modification time.
    pub last_modified: Option<DateTime<Utc>>,

    /// Percentage of objects in each storage class.
    pub storage_classes: StorageClasses,
}

impl BucketMetrics {
    /// Copy these metrics onto `bucket`.
    pub fn apply(self, bucket: &mut Bucket) {
        bucket.object_count    = self.object_count;
        bucket.size_bytes      = self.size_bytes;
        bucket.last_modified   = self.last_modified;
        bucket.storage_classes = self.storage_classes;
    }
}

// Running totals while paging through a listing.
#[derive(Debug, Default)]
struct Tally {
    count:         u64,
    size:          u64,
    last_modified: Option<DateTime<Utc>>,
    classes:       BTreeMap<String, u64>,
}

impl Tally {
    fn add(&mut self, object: &ObjectRecord) {
        self.count += 1;
        self.size  += object.size_bytes;

        if object.last_modified > self.last_modified {
            self.last_modified = object.last_modified;
        }

        *self.classes
            .entry(object.storage_class.clone())
            .or_default() += 1;
    }

    fn finish(self) -> BucketMetrics {
        // An empty bucket has no distribution at all, rather than a division
        // by zero.
        let storage_classes = if self.count == 0 {
            StorageClasses::new()
        }
        else {
            let total = self.count as f64;

            self.classes
                .into_iter()
                .map(|(class, n)| (class, n as f64 * 100.0 / total))
                .collect()
        };

        BucketMetrics {
            object_count:    self.count,
            size_bytes:      self.size,
            last_modified:   self.last_modified,
            storage_classes: storage_classes,
        }
    }
}

/// Computes `BucketMetrics` by paging through a bucket's object listing.
#[derive(Clone, Debug)]
pub struct MetricsCollector {
    timeout: Duration,
}

impl MetricsCollector {
    /// Return a new `MetricsCollector` applying `timeout` to each page.
    pub fn new(timeout: Duration) -> Self {
        Self {
            timeout: timeout,
        }
    }

    /// Page through every object in `bucket` using `client`.
    ///
    /// Nothing is returned unless every page was fetched, so a failure part
    /// way through never leaves partial metrics behind.
    pub async fn collect<C>(
        &self,
        client: &C,
        bucket: &str,
    ) -> Result<BucketMetrics, EnrichError>
    where
        C: StorageClient + ?Sized,
    {
        debug!("collect: Listing objects for '{}'", bucket);

        let mut tally = Tally::default();
        let mut token = None;
        let mut page  = 0;

        // Loop until all objects are processed.
        loop {
            let output = with_timeout(
                self.timeout,
                client.list_objects(bucket, token),
            )
            .await
            .with_context(|| format!("listing page {}", page + 1))
            .map_err(|e| EnrichError::Metrics(format!("{:#}", e)))?;

            for object in &output.objects {
                tally.add(object);
            }

            page += 1;

            match output.next_token {
                Some(next) => token = Some(next),
                None       => break,
            }
        }

        debug!(
            "collect: '{}' has {} objects over {} pages",
            bucket,
            tally.count,
            page,
        );

        Ok(tally.finish())
    }
}
