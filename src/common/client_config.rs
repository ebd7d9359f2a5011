// ClientConfig
#![forbid(unsafe_code)]
#![deny(missing_docs)]
use std::str::FromStr;
use std::time::Duration;
use super::{
    ConfigError,
    FilterPredicate,
    GroupKey,
    Region,
    SizeUnit,
    SortDirection,
    SortKey,
};

/// Default number of enrichment workers.
pub const DEFAULT_WORKERS: usize = 10;

/// Default trailing window for cost collection, in days.
pub const DEFAULT_COST_PERIOD_DAYS: u32 = 30;

/// Default cost allocation tag holding the bucket name.
pub const DEFAULT_COST_TAG: &str = "Name";

/// Default timeout applied to each individual AWS call.
pub const DEFAULT_CALL_TIMEOUT: Duration = Duration::from_secs(120);

/// What happens to a bucket whose object metrics couldn't be collected.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum MetricsFailurePolicy {
    /// Keep the bucket with zeroed metrics and mark it degraded.
    #[default]
    Keep,

    /// Drop the bucket from the results.
    Drop,
}

/// Options for the optional cost collection stage.
#[derive(Clone, Debug, PartialEq)]
pub struct CostOptions {
    /// Length of the trailing window, in days. Between 1 and 365.
    pub period_days: u32,

    /// Cost allocation tag key whose value is the bucket name.
    pub tag: String,
}

impl Default for CostOptions {
    fn default() -> Self {
        Self {
            period_days: DEFAULT_COST_PERIOD_DAYS,
            tag:         DEFAULT_COST_TAG.into(),
        }
    }
}

/// Client configuration.
#[derive(Clone, Debug)]
pub struct ClientConfig {
    /// The region that bucket listing and location lookups are made from.
    pub region: Region,

    /// How bucket sizes are displayed.
    pub unit: SizeUnit,

    /// Number of concurrent enrichment workers. Always at least 1.
    pub workers: usize,

    /// Optional inclusion filter.
    pub filter: Option<FilterPredicate>,

    /// Output sort key.
    pub sort_key: SortKey,

    /// Output sort direction.
    pub sort_direction: SortDirection,

    /// Output grouping.
    pub group: GroupKey,

    /// Cost collection options. `None` disables cost collection.
    pub cost: Option<CostOptions>,

    /// Timeout applied to each AWS call made while enriching a bucket.
    pub call_timeout: Duration,

    /// Handling of buckets whose metrics couldn't be collected.
    pub metrics_failure: MetricsFailurePolicy,
}

impl Default for ClientConfig {
    /// Returns a default `ClientConfig`.
    ///
    /// ```rust
    /// ClientConfig {
    ///     region:          Region::new(),
    ///     unit:            SizeUnit::default(),
    ///     workers:         10,
    ///     filter:          None,
    ///     sort_key:        SortKey::Name,
    ///     sort_direction:  SortDirection::Ascending,
    ///     group:           GroupKey::None,
    ///     cost:            None,
    ///     call_timeout:    Duration::from_secs(120),
    ///     metrics_failure: MetricsFailurePolicy::Keep,
    /// }
    /// ```
    fn default() -> Self {
        Self {
            region:          Region::new(),
            unit:            SizeUnit::default(),
            workers:         DEFAULT_WORKERS,
            filter:          None,
            sort_key:        SortKey::default(),
            sort_direction:  SortDirection::default(),
            group:           GroupKey::default(),
            cost:            None,
            call_timeout:    DEFAULT_CALL_TIMEOUT,
            metrics_failure: MetricsFailurePolicy::default(),
        }
    }
}

/// Parse a worker count, which must be at least 1.
pub fn parse_workers(s: &str) -> Result<usize, ConfigError> {
    match usize::from_str(s) {
        Ok(workers) if workers >= 1 => Ok(workers),
        _                           => Err(ConfigError::InvalidWorkers(s.into())),
    }
}

/// Parse a cost period, which must be between 1 and 365 days.
pub fn parse_cost_period(s: &str) -> Result<u32, ConfigError> {
    match u32::from_str(s) {
        Ok(days) if (1..=365).contains(&days) => Ok(days),
        _ => Err(ConfigError::InvalidCostPeriod(s.into())),
    }
}

/// Parse a per-call timeout in whole seconds.
pub fn parse_timeout(s: &str) -> Result<Duration, ConfigError> {
    match u64::from_str(s) {
        Ok(secs) if secs > 0 => Ok(Duration::from_secs(secs)),
        _                    => Err(ConfigError::InvalidTimeout(s.into())),
    }
}
