// CostCollector: trailing period amortized cost for a bucket
#![forbid(unsafe_code)]
#![deny(missing_docs)]
use anyhow::Result;
use async_trait::async_trait;
use chrono::{
    Days,
    NaiveDate,
    Utc,
};
use crate::common::{
    with_timeout,
    CostOptions,
    EnrichError,
};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Cost Explorer `SERVICE` dimension value for S3.
pub const S3_SERVICE_NAME: &str = "Amazon Simple Storage Service";

/// The cost metric that is requested.
pub const COST_METRIC: &str = "AmortizedCost";

/// A single aggregated cost query.
///
/// Costs are filtered to `service` and to resources tagged with
/// `tag_key = tag_value`, over `[start, end)` with monthly granularity.
#[derive(Clone, Debug, PartialEq)]
pub struct CostQuery {
    /// Service dimension to filter on.
    pub service: String,

    /// Cost allocation tag key.
    pub tag_key: String,

    /// Required value of the tag, the bucket name.
    pub tag_value: String,

    /// First day of the window, inclusive.
    pub start: NaiveDate,

    /// Day after the window, exclusive.
    pub end: NaiveDate,
}

/// `CostService` represents a cost accounting backend.
#[async_trait]
pub trait CostService: Send + Sync {
    /// Returns the `AmortizedCost` amount of each monthly period matching
    /// `query`.
    async fn period_amounts(&self, query: &CostQuery) -> Result<Vec<f64>>;
}

/// Returns the `[start, end)` window covering the last `period_days` days
/// and all of `today`.
pub fn cost_window(today: NaiveDate, period_days: u32) -> (NaiveDate, NaiveDate) {
    let start = today - Days::new(u64::from(period_days));
    let end   = today + Days::new(1);

    (start, end)
}

/// Collects the cost of individual buckets.
#[derive(Clone)]
pub struct CostCollector {
    service: Arc<dyn CostService>,
    options: CostOptions,
    timeout: Duration,
}

impl CostCollector {
    /// Return a new `CostCollector` querying `service`.
    pub fn new(
        service: Arc<dyn CostService>,
        options: CostOptions,
        timeout: Duration,
    ) -> Self {
        Self {
            service: service,
            options: options,
            timeout: timeout,
        }
    }

    /// The query that will be made for `bucket` on `today`.
    pub fn query(&self, bucket: &str, today: NaiveDate) -> CostQuery {
        let (start, end) = cost_window(today, self.options.period_days);

        CostQuery {
            service:   S3_SERVICE_NAME.into(),
            tag_key:   self.options.tag.clone(),
            tag_value: bucket.into(),
            start:     start,
            end:       end,
        }
    }

    /// Return the cost of `bucket` over the configured trailing period,
    /// ending today.
    pub async fn collect(&self, bucket: &str) -> Result<f64, EnrichError> {
        self.collect_on(bucket, Utc::now().date_naive()).await
    }

    /// Return the cost of `bucket` over the configured trailing period,
    /// ending on `today`.
    ///
    /// No matching periods is a cost of zero, not an error.
    pub async fn collect_on(
        &self,
        bucket: &str,
        today: NaiveDate,
    ) -> Result<f64, EnrichError> {
        let query = self.query(bucket, today);

        debug!("collect_on: {:?}", query);

        let amounts = with_timeout(
            self.timeout,
            self.service.period_amounts(&query),
        )
        .await
        .map_err(|e| EnrichError::Cost(format!("{:#}", e)))?;

        let cost: f64 = amounts.iter().sum();

        debug!("collect_on: cost for '{}' is {}", bucket, cost);

        Ok(cost)
    }
}
