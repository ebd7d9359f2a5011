// s3dig: Dig through AWS S3 buckets for their size, objects, storage classes
// and cost.
#![forbid(unsafe_code)]
use anyhow::{
    Context,
    Result,
};
use std::sync::Arc;
use tracing::{
    debug,
    info,
};
use tracing_subscriber::EnvFilter;

mod cli;
mod common;
mod cost;
mod output;
mod pipeline;
mod s3;

#[cfg(test)]
mod mock;

use common::{
    group_buckets,
    sort_buckets,
    with_timeout,
    BucketGroup,
    ClientConfig,
    ClientFactory,
    StorageClient,
};
use cost::CostCollector;
use pipeline::{
    Outcome,
    Stages,
};

// Log filter used when RUST_LOG isn't set.
const DEFAULT_LOG_FILTER: &str = "warn";

// Logs go to stderr so that stdout only carries the tables.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[cfg(feature = "cost")]
fn cost_collector(
    config: &ClientConfig,
    sdk_config: &aws_config::SdkConfig,
) -> Option<CostCollector> {
    config.cost.clone().map(|options| {
        let client = cost::Client::new(sdk_config);

        CostCollector::new(Arc::new(client), options, config.call_timeout)
    })
}

#[cfg(not(feature = "cost"))]
fn cost_collector(
    _config: &ClientConfig,
    _sdk_config: &aws_config::SdkConfig,
) -> Option<CostCollector> {
    None
}

// List every bucket, enrich them and return them sorted and grouped for
// display.
async fn dig<F>(
    config: &ClientConfig,
    factory: Arc<F>,
    cost: Option<CostCollector>,
) -> Result<Vec<BucketGroup>>
where
    F: ClientFactory + 'static,
{
    let default_region = config.region.name().to_string();

    let default_client = with_timeout(
        config.call_timeout,
        factory.create(&default_region),
    )
    .await
    .context("Unable to initialize the default S3 client")?;

    let default_client = Arc::new(default_client);

    let buckets = with_timeout(
        config.call_timeout,
        default_client.list_buckets(),
    )
    .await
    .context("Unable to list the buckets")?;

    debug!("dig: Found {} buckets from '{}'", buckets.len(), default_region);

    let stages = Stages {
        default_region:  default_region,
        default_client:  default_client,
        factory:         factory,
        filter:          config.filter.clone(),
        cost:            cost,
        call_timeout:    config.call_timeout,
        metrics_failure: config.metrics_failure,
    };

    let report = pipeline::run(buckets, config.workers, stages).await?;

    for outcome in report.outcomes() {
        if let Outcome::Skipped { name, reason } = outcome {
            debug!("dig: Skipped '{}': {}", name, reason);
        }
    }

    let total_bytes: u64 = report.accepted()
        .iter()
        .map(|bucket| bucket.size_bytes)
        .sum();

    info!(
        "Enriched buckets: {} accepted, {} degraded, {} skipped, {} bytes in total",
        report.accepted_count(),
        report.degraded_count(),
        report.skipped_count(),
        total_bytes,
    );

    let mut buckets = report.into_accepted();
    sort_buckets(&mut buckets, config.sort_key, config.sort_direction);

    Ok(group_buckets(buckets, config.group))
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let matches = cli::parse_args();
    let config  = ClientConfig::try_from(&matches)?;

    let factory = s3::Factory::from_env(&config.region).await;
    let cost    = cost_collector(&config, factory.sdk_config());

    let groups = dig(&config, Arc::new(factory), cost).await?;

    println!(
        "{}",
        output::render(&groups, &config.unit, config.cost.is_some()),
    );

    Ok(())
}
