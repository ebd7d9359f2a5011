// Handles region things
#![forbid(unsafe_code)]
#![deny(missing_docs)]
use aws_config::meta::region::future;
use aws_config::meta::region::ProvideRegion;
use aws_types::region;
use std::env;
use tracing::debug;

/// Region used when neither the CLI nor the environment provide one.
pub const DEFAULT_REGION: &str = "us-east-1";

/// The default region that buckets are listed and located from.
#[derive(Clone, Debug, PartialEq)]
pub struct Region {
    region: region::Region,
}

impl Default for Region {
    fn default() -> Self {
        Self {
            region: region::Region::from_static(DEFAULT_REGION),
        }
    }
}

impl Region {
    /// Returns a `Region` taken from the environment, falling back to
    /// `DEFAULT_REGION`.
    pub fn new() -> Self {
        // By default, we try to get a region from the environment, this might
        // be overridden later depending on CLI options.
        let possibilities = vec![
            env::var("AWS_REGION"),
            env::var("AWS_DEFAULT_REGION"),
        ];

        let region = possibilities
            .iter()
            .find_map(|region| region.as_ref().ok())
            .filter(|region| !region.is_empty())
            .map(|region| region::Region::new(region.to_owned()));

        debug!("AWS_REGION in environment is: {:?}", region);

        match region {
            Some(region) => Self { region },
            None         => Self::default(),
        }
    }

    /// Returns the region name
    pub fn name(&self) -> &str {
        self.region.as_ref()
    }

    /// Replace the region with `region`.
    pub fn set_region(mut self, region: &str) -> Self {
        debug!("Region set to: {:?}", region);

        self.region = region::Region::new(region.to_string());
        self
    }
}

/// Turn an S3 `LocationConstraint` into a region name.
///
/// Location constraints for sufficiently old buckets in S3 may not quite meet
/// expectations. A missing or empty constraint means `us-east-1` and the
/// legacy `EU` constraint means `eu-west-1`.
pub fn region_from_location(location: Option<&str>) -> String {
    match location {
        None | Some("") => "us-east-1".into(),
        Some("EU")      => "eu-west-1".into(),
        Some(location)  => location.into(),
    }
}

impl ProvideRegion for Region {
    // Takes our region string and returns a proper AWS Region, this should
    // allow us to pass our Region into AWS SDK functions expecting an AWS
    // Region.
    fn region(&self) -> future::ProvideRegion<'_> {
        future::ProvideRegion::ready(Some(self.region.clone()))
    }
}
