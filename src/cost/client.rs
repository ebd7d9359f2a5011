// Implements the Cost Explorer Client
#![forbid(unsafe_code)]
#![deny(missing_docs)]
use anyhow::{
    Context,
    Result,
};
use async_trait::async_trait;
use aws_config::SdkConfig;
use aws_sdk_costexplorer::client::Client as CostExplorerClient;
use aws_sdk_costexplorer::config::{
    Builder as CostExplorerConfigBuilder,
    Region as CostExplorerRegion,
};
use aws_sdk_costexplorer::types::{
    DateInterval,
    Dimension,
    DimensionValues,
    Expression,
    Granularity,
    MatchOption,
    ResultByTime,
    TagValues,
};
use super::collector::{
    CostQuery,
    CostService,
    COST_METRIC,
};
use tracing::debug;

/// Cost Explorer is only served from this region.
pub const COST_EXPLORER_REGION: &str = "us-east-1";

const DATE_FORMAT: &str = "%Y-%m-%d";

/// The Cost Explorer `Client`.
#[derive(Clone, Debug)]
pub struct Client {
    /// The AWS SDK `CostExplorerClient`.
    pub client: CostExplorerClient,
}

impl Client {
    /// Return a new Cost Explorer `Client` sharing credentials with
    /// `config`.
    pub fn new(config: &SdkConfig) -> Self {
        debug!("new: Creating CostExplorerClient");

        let conf = CostExplorerConfigBuilder::from(config)
            .region(CostExplorerRegion::from_static(COST_EXPLORER_REGION))
            .build();

        Self {
            client: CostExplorerClient::from_conf(conf),
        }
    }
}

#[async_trait]
impl CostService for Client {
    async fn period_amounts(&self, query: &CostQuery) -> Result<Vec<f64>> {
        let interval = DateInterval::builder()
            .start(query.start.format(DATE_FORMAT).to_string())
            .end(query.end.format(DATE_FORMAT).to_string())
            .build()?;

        let mut amounts         = Vec::new();
        let mut next_page_token = None;

        loop {
            let output = self.client.get_cost_and_usage()
                .time_period(interval.clone())
                .granularity(Granularity::Monthly)
                .metrics(COST_METRIC)
                .filter(filter_expression(query))
                .set_next_page_token(next_page_token)
                .send()
                .await?;

            for result in output.results_by_time() {
                amounts.push(period_amount(result)?);
            }

            match output.next_page_token() {
                Some(token) => next_page_token = Some(token.to_string()),
                None        => break,
            }
        }

        debug!(
            "period_amounts: {} periods for '{}'",
            amounts.len(),
            query.tag_value,
        );

        Ok(amounts)
    }
}

/// Build the `SERVICE` AND tag filter for `query`.
pub fn filter_expression(query: &CostQuery) -> Expression {
    let service = DimensionValues::builder()
        .key(Dimension::Service)
        .values(&query.service)
        .build();

    let tag = TagValues::builder()
        .key(&query.tag_key)
        .values(&query.tag_value)
        .match_options(MatchOption::Equals)
        .build();

    Expression::builder()
        .and(Expression::builder().dimensions(service).build())
        .and(Expression::builder().tags(tag).build())
        .build()
}

/// Return the `AmortizedCost` amount of a single period.
///
/// A period without the metric costs nothing.
pub fn period_amount(result: &ResultByTime) -> Result<f64> {
    let amount = result.total()
        .and_then(|total| total.get(COST_METRIC))
        .and_then(|metric| metric.amount());

    match amount {
        Some(amount) => amount.parse::<f64>()
            .with_context(|| format!("invalid cost amount '{}'", amount)),
        None => Ok(0.0),
    }
}
