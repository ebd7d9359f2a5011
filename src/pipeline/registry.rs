// ClientRegistry: one client per region, created on first use
#![forbid(unsafe_code)]
#![deny(missing_docs)]
use crate::common::{
    with_timeout,
    ClientFactory,
    EnrichError,
};
use std::collections::HashMap;
use std::sync::{
    Arc,
    Mutex,
    PoisonError,
};
use std::time::Duration;
use tokio::sync::OnceCell;
use tracing::debug;

type ClientCell<C> = Arc<OnceCell<Arc<C>>>;

/// Thread-safe cache of region scoped clients.
///
/// Each region has its own `OnceCell`, so concurrent first use of a region
/// results in exactly one call to the factory while other regions proceed
/// independently. If creation fails the cell stays empty and the next caller
/// tries again.
pub struct ClientRegistry<F: ClientFactory> {
    factory: Arc<F>,
    timeout: Duration,
    clients: Mutex<HashMap<String, ClientCell<F::Client>>>,
}

impl<F: ClientFactory> ClientRegistry<F> {
    /// Return a new, empty `ClientRegistry` creating clients with `factory`.
    ///
    /// `timeout` bounds each individual client creation.
    pub fn new(factory: Arc<F>, timeout: Duration) -> Self {
        Self {
            factory: factory,
            timeout: timeout,
            clients: Mutex::new(HashMap::new()),
        }
    }

    /// Install an already created `client` for `region`.
    ///
    /// This is how the default region's client gets in before any worker
    /// starts.
    pub fn seed(&self, region: &str, client: Arc<F::Client>) {
        debug!("seed: Seeding client for '{}'", region);

        let cell = Arc::new(OnceCell::new_with(Some(client)));

        self.clients
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(region.into(), cell);
    }

    // The lock is only held long enough to find or insert the cell, never
    // across client creation.
    fn cell(&self, region: &str) -> ClientCell<F::Client> {
        let mut clients = self.clients
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        Arc::clone(clients.entry(region.into()).or_default())
    }

    /// Return the client for `region`, creating it if this is the first time
    /// it has been asked for.
    pub async fn get_or_create(
        &self,
        region: &str,
    ) -> Result<Arc<F::Client>, EnrichError> {
        let cell = self.cell(region);

        let client = cell
            .get_or_try_init(|| async {
                debug!("get_or_create: Creating client for '{}'", region);

                let client = with_timeout(
                    self.timeout,
                    self.factory.create(region),
                ).await?;

                Ok::<_, anyhow::Error>(Arc::new(client))
            })
            .await
            .map_err(|e| EnrichError::ClientInit {
                region: region.into(),
                reason: format!("{:#}", e),
            })?;

        Ok(Arc::clone(client))
    }

    /// Regions that currently have a client, in name order.
    pub fn regions(&self) -> Vec<String> {
        let clients = self.clients
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        let mut regions: Vec<String> = clients
            .iter()
            .filter(|(_, cell)| cell.initialized())
            .map(|(region, _)| region.clone())
            .collect();

        regions.sort();
        regions
    }
}
