// Creates region scoped S3 clients
#![forbid(unsafe_code)]
#![deny(missing_docs)]
use anyhow::{
    bail,
    Result,
};
use async_trait::async_trait;
use aws_config::{
    BehaviorVersion,
    SdkConfig,
};
use crate::common::{
    ClientFactory,
    Region,
};
use super::client::Client;
use tracing::debug;

/// Creates S3 `Client`s for any region from one shared `SdkConfig`.
///
/// Credentials are resolved once when the `SdkConfig` is loaded, so creating
/// a client for a new region is cheap.
#[derive(Clone, Debug)]
pub struct Factory {
    config: SdkConfig,
}

impl Factory {
    /// Return a new `Factory` using `config`.
    pub fn new(config: SdkConfig) -> Self {
        Self {
            config: config,
        }
    }

    /// Load AWS configuration from the environment with `region` as the
    /// default region.
    pub async fn from_env(region: &Region) -> Self {
        debug!("from_env: Loading AWS config for '{}'", region.name());

        let config = aws_config::defaults(BehaviorVersion::latest())
            .region(region.clone())
            .load()
            .await;

        Self::new(config)
    }

    /// The shared `SdkConfig`.
    pub fn sdk_config(&self) -> &SdkConfig {
        &self.config
    }
}

#[async_trait]
impl ClientFactory for Factory {
    type Client = Client;

    async fn create(&self, region: &str) -> Result<Client> {
        if region.trim().is_empty() {
            bail!("empty region name");
        }

        Ok(Client::new(&self.config, region))
    }
}
