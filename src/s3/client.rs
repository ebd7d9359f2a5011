// Implements the S3 Client
#![forbid(unsafe_code)]
#![deny(missing_docs)]
use anyhow::Result;
use aws_config::SdkConfig;
use aws_sdk_s3::client::Client as S3Client;
use aws_sdk_s3::config::{
    Builder as S3ConfigBuilder,
    Region as S3Region,
};
use aws_sdk_s3::types::{
    Bucket as S3Bucket,
    Object,
};
use aws_smithy_types_convert::date_time::DateTimeExt;
use crate::common::{
    region_from_location,
    Bucket,
    Buckets,
    ObjectPage,
    ObjectRecord,
    DEFAULT_STORAGE_CLASS,
    OBJECT_PAGE_SIZE,
};
use tracing::debug;

/// The S3 `Client`.
#[derive(Clone, Debug)]
pub struct Client {
    /// The AWS SDK `S3Client`.
    pub client: S3Client,

    /// `Region` that this client makes its requests in.
    pub region: String,
}

impl Client {
    /// Return a new S3 `Client` for `region`, sharing credentials and other
    /// settings with `config`.
    pub fn new(config: &SdkConfig, region: &str) -> Self {
        debug!("new: Creating S3Client in region '{}'", region);

        let conf = S3ConfigBuilder::from(config)
            .region(S3Region::new(region.to_string()))
            .build();

        Self {
            client: S3Client::from_conf(conf),
            region: region.into(),
        }
    }

    /// Returns every bucket in the account.
    pub async fn list_buckets(&self) -> Result<Buckets> {
        debug!("list_buckets: Listing...");

        let mut buckets            = Buckets::new();
        let mut continuation_token = None;

        loop {
            let output = self.client.list_buckets()
                .set_continuation_token(continuation_token)
                .send()
                .await?;

            buckets.extend(output.buckets().iter().filter_map(bucket_from));

            match output.continuation_token() {
                Some(token) => continuation_token = Some(token.to_string()),
                None        => break,
            }
        }

        debug!("list_buckets: Found {} buckets", buckets.len());

        Ok(buckets)
    }

    /// Return the bucket location (region name) for the given `bucket`.
    ///
    /// This method will properly handle the case of the `null` (empty) and
    /// `EU` location constraints, by replacing them with `us-east-1` and
    /// `eu-west-1` respectively.
    pub async fn get_bucket_location(&self, bucket: &str) -> Result<String> {
        debug!("get_bucket_location for '{}'", bucket);

        let output = self.client.get_bucket_location()
            .bucket(bucket)
            .send()
            .await?;

        let location = output.location_constraint().map(|l| l.as_str());

        debug!("GetBucketLocation API returned '{:?}'", location);

        Ok(region_from_location(location))
    }

    /// Return a single page of the current objects in `bucket`.
    pub async fn list_objects_page(
        &self,
        bucket: &str,
        continuation_token: Option<String>,
    ) -> Result<ObjectPage> {
        let output = self.client.list_objects_v2()
            .bucket(bucket)
            .max_keys(OBJECT_PAGE_SIZE)
            .set_continuation_token(continuation_token)
            .send()
            .await?;

        let objects = output.contents()
            .iter()
            .map(object_record)
            .collect();

        // If the output was truncated (Some(true)), we should have a
        // next_continuation_token.
        // If it wasn't, (Some(false) | None) we're done.
        let next_token = match output.is_truncated() {
            Some(true) => output.next_continuation_token().map(String::from),
            _          => None,
        };

        Ok(ObjectPage {
            objects:    objects,
            next_token: next_token,
        })
    }
}

/// Convert a listed SDK bucket into our `Bucket`, skipping nameless ones.
pub fn bucket_from(bucket: &S3Bucket) -> Option<Bucket> {
    let name = bucket.name()?;

    let creation_date = bucket.creation_date()
        .and_then(|date| date.to_chrono_utc().ok());

    Some(Bucket::new(name, creation_date))
}

/// Convert a listed SDK object into an `ObjectRecord`.
pub fn object_record(object: &Object) -> ObjectRecord {
    let storage_class = object.storage_class()
        .map(|class| class.as_str().to_string())
        .unwrap_or_else(|| DEFAULT_STORAGE_CLASS.into());

    ObjectRecord {
        size_bytes:    object.size().map_or(0, |size| size.max(0) as u64),
        last_modified: object.last_modified()
            .and_then(|date| date.to_chrono_utc().ok()),
        storage_class: storage_class,
    }
}
