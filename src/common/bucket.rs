// Definition of a bucket
#![forbid(unsafe_code)]
#![deny(missing_docs)]
use chrono::{
    DateTime,
    Utc,
};
use std::collections::BTreeMap;

/// Storage class label mapped to the percentage of objects in that class.
///
/// A `BTreeMap` keeps the labels in a stable order for rendering.
pub type StorageClasses = BTreeMap<String, f64>;

/// Represents an S3 bucket.
///
/// This will always have a `name`. Everything else starts at its zero value
/// and is filled in by the enrichment pipeline.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Bucket {
    /// Bucket name, unique within the account.
    pub name: String,

    /// When the bucket was created, as reported by `ListBuckets`.
    pub creation_date: Option<DateTime<Utc>>,

    /// Home region of the bucket. `None` until resolved.
    pub region: Option<String>,

    /// Number of objects in the bucket.
    pub object_count: u64,

    /// Sum of the sizes of all objects in the bucket.
    pub size_bytes: u64,

    /// Most recent `LastModified` of any object in the bucket.
    pub last_modified: Option<DateTime<Utc>>,

    /// Distribution of objects across storage classes.
    pub storage_classes: StorageClasses,

    /// Amortized cost over the requested period, if it was collected.
    pub cost: Option<f64>,
}

impl Bucket {
    /// Return a new `Bucket` with only its catalog fields populated.
    pub fn new<S>(name: S, creation_date: Option<DateTime<Utc>>) -> Self
    where
        S: Into<String>,
    {
        Self {
            name:          name.into(),
            creation_date: creation_date,
            ..Default::default()
        }
    }

    /// Region name for display and grouping.
    pub fn region_name(&self) -> &str {
        self.region.as_deref().unwrap_or("unknown")
    }
}

/// Convenience type for a list of `Bucket`.
pub type Buckets = Vec<Bucket>;
