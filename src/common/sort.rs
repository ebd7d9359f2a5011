// Sorting and grouping of enriched buckets
#![forbid(unsafe_code)]
#![deny(missing_docs)]
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::str::FromStr;
use super::{
    Bucket,
    Buckets,
    ConfigError,
};

/// The bucket attribute that output is sorted by.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum SortKey {
    /// Bucket name.
    #[default]
    Name,
    /// Region name.
    Region,
    /// Total size in bytes.
    Size,
    /// Number of objects.
    Files,
    /// Bucket creation date.
    Created,
    /// Most recent object modification.
    Modified,
    /// Amortized cost.
    Cost,
}

impl FromStr for SortKey {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "name"     => Ok(Self::Name),
            "region"   => Ok(Self::Region),
            "size"     => Ok(Self::Size),
            "files"    => Ok(Self::Files),
            "created"  => Ok(Self::Created),
            "modified" => Ok(Self::Modified),
            "cost"     => Ok(Self::Cost),
            _          => Err(ConfigError::InvalidSortKey(s.into())),
        }
    }
}

/// Direction of the sort.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum SortDirection {
    /// Smallest first.
    #[default]
    Ascending,
    /// Largest first.
    Descending,
}

impl FromStr for SortDirection {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "asc"  => Ok(Self::Ascending),
            "desc" => Ok(Self::Descending),
            _      => Err(ConfigError::InvalidSortDirection(s.into())),
        }
    }
}

/// How output is grouped before rendering.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum GroupKey {
    /// A single group of every bucket.
    #[default]
    None,
    /// One group per region.
    Region,
}

impl FromStr for GroupKey {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "none"   => Ok(Self::None),
            "region" => Ok(Self::Region),
            _        => Err(ConfigError::InvalidGroupKey(s.into())),
        }
    }
}

/// A group of buckets, with the group's label if grouping was requested.
pub type BucketGroup = (Option<String>, Buckets);

// Missing values compare as less than any present value.
fn compare(a: &Bucket, b: &Bucket, key: SortKey) -> Ordering {
    match key {
        SortKey::Name     => a.name.cmp(&b.name),
        SortKey::Region   => a.region.cmp(&b.region),
        SortKey::Size     => a.size_bytes.cmp(&b.size_bytes),
        SortKey::Files    => a.object_count.cmp(&b.object_count),
        SortKey::Created  => a.creation_date.cmp(&b.creation_date),
        SortKey::Modified => a.last_modified.cmp(&b.last_modified),
        SortKey::Cost     => {
            match (a.cost, b.cost) {
                (Some(a), Some(b)) => a.total_cmp(&b),
                (a, b)             => a.is_some().cmp(&b.is_some()),
            }
        },
    }
}

/// Sort `buckets` in place by `key` in `direction`.
///
/// Ties are always broken by ascending bucket name so that output is stable
/// regardless of the order the buckets finished enrichment in.
pub fn sort_buckets(buckets: &mut [Bucket], key: SortKey, direction: SortDirection) {
    buckets.sort_by(|a, b| {
        let ordering = match direction {
            SortDirection::Ascending  => compare(a, b, key),
            SortDirection::Descending => compare(b, a, key),
        };

        ordering.then_with(|| a.name.cmp(&b.name))
    });
}

/// Split already sorted `buckets` into groups.
///
/// Region groups are returned in region name order and keep the order of
/// the buckets within them.
pub fn group_buckets(buckets: Buckets, group: GroupKey) -> Vec<BucketGroup> {
    match group {
        GroupKey::None   => vec![(None, buckets)],
        GroupKey::Region => {
            let mut groups: BTreeMap<String, Buckets> = BTreeMap::new();

            for bucket in buckets {
                groups
                    .entry(bucket.region_name().to_string())
                    .or_default()
                    .push(bucket);
            }

            groups
                .into_iter()
                .map(|(region, buckets)| (Some(region), buckets))
                .collect()
        },
    }
}
