// Configuration errors
#![forbid(unsafe_code)]
#![deny(missing_docs)]
use thiserror::Error;

/// Errors raised while turning user supplied options into a `ClientConfig`.
///
/// These are always fatal and are reported before any AWS calls are made.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// `--filter` named a field we can't filter on.
    #[error("'{0}' is not a valid filter, expected one of: name, storageclasses")]
    InvalidFilterField(String),

    /// The filter regex didn't compile.
    #[error("'{regex}' is not a valid regex: {source}")]
    InvalidRegex {
        /// The regex as given.
        regex: String,

        /// Why it failed to compile.
        source: regex::Error,
    },

    /// A filter field was given without a regex.
    #[error("a filter requires a regex")]
    MissingRegex,

    /// A regex was given without a filter field.
    #[error("a regex requires a filter")]
    MissingFilter,

    /// `--sort` named an unknown key.
    #[error("'{0}' is not a valid sort key, expected one of: name, region, size, files, created, modified, cost")]
    InvalidSortKey(String),

    /// `--order` wasn't `asc` or `desc`.
    #[error("'{0}' is not a valid sort order, expected asc or desc")]
    InvalidSortDirection(String),

    /// `--group` named an unknown key.
    #[error("'{0}' is not a valid group, expected none or region")]
    InvalidGroupKey(String),

    /// `--unit` named an unknown unit.
    #[error("'{0}' is not a valid unit, expected one of: b, kb, mb, gb, tb, pb, eb, binary, decimal")]
    InvalidUnit(String),

    /// Worker count below one or not a number.
    #[error("'{0}' is not a valid worker count, it must be at least 1")]
    InvalidWorkers(String),

    /// Cost period outside of 1..=365 days.
    #[error("'{0}' is not a valid cost period, it must be between 1 and 365")]
    InvalidCostPeriod(String),

    /// Per-call timeout wasn't a positive number of seconds.
    #[error("'{0}' is not a valid timeout, it must be a positive number of seconds")]
    InvalidTimeout(String),
}

/// Per-bucket failures from the enrichment stages.
///
/// None of these abort a run. Depending on the stage the bucket is either
/// skipped or kept in a degraded state. Causes are kept as rendered strings
/// so that outcomes can be compared and logged.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum EnrichError {
    /// The bucket's region couldn't be determined.
    #[error("unable to fetch the region: {0}")]
    RegionLookup(String),

    /// A client for the bucket's region couldn't be created.
    #[error("unable to create a client for region '{region}': {reason}")]
    ClientInit {
        /// Region the client was for.
        region: String,

        /// Why creation failed.
        reason: String,
    },

    /// Object metrics couldn't be collected.
    #[error("unable to get the objects metrics: {0}")]
    Metrics(String),

    /// Cost couldn't be collected.
    #[error("unable to get the cost: {0}")]
    Cost(String),
}
