// Command line interface parsing
#![forbid(unsafe_code)]
#![deny(missing_docs)]
use clap::{
    crate_authors,
    crate_description,
    crate_name,
    crate_version,
    Arg,
    ArgAction,
    ArgMatches,
    Command,
};
use crate::common::{
    parse_timeout,
    parse_workers,
    ClientConfig,
    ConfigError,
    FilterPredicate,
    GroupKey,
    MetricsFailurePolicy,
    Region,
    SizeUnit,
    SortDirection,
    SortKey,
    DEFAULT_CALL_TIMEOUT,
    DEFAULT_WORKERS,
};
use std::str::FromStr;
use std::time::Duration;
use tracing::debug;

#[cfg(feature = "cost")]
use crate::common::{
    parse_cost_period,
    CostOptions,
    DEFAULT_COST_PERIOD_DAYS,
    DEFAULT_COST_TAG,
};

// Default unit for displaying sizes
const DEFAULT_UNIT: &str = "mb";

// Default number of workers, as a string for clap
const DEFAULT_WORKERS_STR: &str = "10";

// Default per-call timeout in seconds, as a string for clap
const DEFAULT_TIMEOUT_STR: &str = "120";

// Default cost period in days, as a string for clap
#[cfg(feature = "cost")]
const DEFAULT_COST_PERIOD_STR: &str = "30";

/// Create the clap `Command`.
pub fn create_app() -> Command {
    debug!("Creating CLI app");

    let app = Command::new(crate_name!())
        .version(crate_version!())
        .author(crate_authors!())
        .about(crate_description!())
        .arg(
            Arg::new("DROP_FAILED_METRICS")
                .env("S3DIG_DROP_FAILED_METRICS")
                .hide_env_values(true)
                .long("drop-failed-metrics")
                .help("Leave out buckets whose objects couldn't be listed")
                .action(ArgAction::SetTrue)
        )
        .arg(
            Arg::new("FILTER")
                .env("S3DIG_FILTER")
                .hide_env_values(true)
                .long("filter")
                .short('f')
                .value_name("FIELD")
                .help("Only show buckets where FIELD matches --regex: name or storageclasses")
                .requires("REGEX")
        )
        .arg(
            Arg::new("GROUP")
                .env("S3DIG_GROUP")
                .hide_env_values(true)
                .long("group")
                .short('g')
                .value_name("GROUP")
                .help("Group the output: none or region")
                .value_parser(GroupKey::from_str)
                .default_value("none")
        )
        .arg(
            Arg::new("ORDER")
                .env("S3DIG_ORDER")
                .hide_env_values(true)
                .long("order")
                .short('o')
                .value_name("ORDER")
                .help("Sort order: asc or desc")
                .value_parser(SortDirection::from_str)
                .default_value("asc")
        )
        .arg(
            Arg::new("REGEX")
                .env("S3DIG_REGEX")
                .hide_env_values(true)
                .long("regex")
                .short('x')
                .value_name("REGEX")
                .help("Regular expression used by --filter")
                .requires("FILTER")
        )
        .arg(
            Arg::new("REGION")
                .env("AWS_REGION")
                .hide_env_values(true)
                .long("region")
                .short('r')
                .value_name("REGION")
                .help("Set the AWS region that buckets are listed and located from")
        )
        .arg(
            Arg::new("SORT")
                .env("S3DIG_SORT")
                .hide_env_values(true)
                .long("sort")
                .short('s')
                .value_name("KEY")
                .help("Sort by: name, region, size, files, created, modified or cost")
                .value_parser(SortKey::from_str)
                .default_value("name")
        )
        .arg(
            Arg::new("TIMEOUT")
                .env("S3DIG_TIMEOUT")
                .hide_env_values(true)
                .long("timeout")
                .short('t')
                .value_name("SECONDS")
                .help("Timeout for each individual AWS call")
                .value_parser(parse_timeout)
                .default_value(DEFAULT_TIMEOUT_STR)
        )
        .arg(
            Arg::new("UNIT")
                .env("S3DIG_UNIT")
                .hide_env_values(true)
                .long("unit")
                .short('u')
                .value_name("UNIT")
                .help("Sets the unit to use for size display: b, kb, mb, gb, tb, pb, eb, binary or decimal")
                .value_parser(SizeUnit::from_str)
                .default_value(DEFAULT_UNIT)
        )
        .arg(
            Arg::new("WORKERS")
                .env("S3DIG_WORKERS")
                .hide_env_values(true)
                .long("workers")
                .short('w')
                .value_name("WORKERS")
                .help("Number of buckets to enrich concurrently")
                .value_parser(parse_workers)
                .default_value(DEFAULT_WORKERS_STR)
        );

    #[cfg(feature = "cost")]
    let app = app
        .arg(
            Arg::new("COST")
                .env("S3DIG_COST")
                .hide_env_values(true)
                .long("cost")
                .short('c')
                .help("Fetch the amortized cost of each bucket from Cost Explorer")
                .action(ArgAction::SetTrue)
        )
        .arg(
            Arg::new("COST_PERIOD")
                .env("S3DIG_COST_PERIOD")
                .hide_env_values(true)
                .long("cost-period")
                .value_name("DAYS")
                .help("Number of trailing days to fetch the cost for")
                .value_parser(parse_cost_period)
                .default_value(DEFAULT_COST_PERIOD_STR)
        )
        .arg(
            Arg::new("COST_TAG")
                .env("S3DIG_COST_TAG")
                .hide_env_values(true)
                .long("cost-tag")
                .value_name("TAG")
                .help("Cost allocation tag holding the bucket name")
                .default_value(DEFAULT_COST_TAG)
        );

    app
}

/// Parse the command line arguments.
pub fn parse_args() -> ArgMatches {
    debug!("Parsing command line arguments");

    create_app().get_matches()
}

#[cfg(feature = "cost")]
fn cost_options(matches: &ArgMatches) -> Option<CostOptions> {
    if !matches.get_flag("COST") {
        return None;
    }

    let period_days = matches.get_one::<u32>("COST_PERIOD")
        .copied()
        .unwrap_or(DEFAULT_COST_PERIOD_DAYS);

    let tag = matches.get_one::<String>("COST_TAG")
        .map_or_else(|| DEFAULT_COST_TAG.to_string(), String::from);

    Some(CostOptions {
        period_days: period_days,
        tag:         tag,
    })
}

#[cfg(not(feature = "cost"))]
fn cost_options(_matches: &ArgMatches) -> Option<crate::common::CostOptions> {
    None
}

impl TryFrom<&ArgMatches> for ClientConfig {
    type Error = ConfigError;

    fn try_from(matches: &ArgMatches) -> Result<Self, Self::Error> {
        let region = match matches.get_one::<String>("REGION") {
            Some(region) => Region::new().set_region(region),
            None         => Region::new(),
        };

        let filter = FilterPredicate::from_parts(
            matches.get_one::<String>("FILTER").map(String::as_str),
            matches.get_one::<String>("REGEX").map(String::as_str),
        )?;

        let metrics_failure = if matches.get_flag("DROP_FAILED_METRICS") {
            MetricsFailurePolicy::Drop
        }
        else {
            MetricsFailurePolicy::Keep
        };

        let config = Self {
            region:          region,
            unit:            matches.get_one::<SizeUnit>("UNIT")
                .cloned()
                .unwrap_or_default(),
            workers:         matches.get_one::<usize>("WORKERS")
                .copied()
                .unwrap_or(DEFAULT_WORKERS),
            filter:          filter,
            sort_key:        matches.get_one::<SortKey>("SORT")
                .copied()
                .unwrap_or_default(),
            sort_direction:  matches.get_one::<SortDirection>("ORDER")
                .copied()
                .unwrap_or_default(),
            group:           matches.get_one::<GroupKey>("GROUP")
                .copied()
                .unwrap_or_default(),
            cost:            cost_options(matches),
            call_timeout:    matches.get_one::<Duration>("TIMEOUT")
                .copied()
                .unwrap_or(DEFAULT_CALL_TIMEOUT),
            metrics_failure: metrics_failure,
        };

        debug!("Client config: {:?}", config);

        Ok(config)
    }
}
