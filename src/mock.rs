// In-memory stand-ins for S3 and Cost Explorer, shared by the tests
#![forbid(unsafe_code)]
use anyhow::{
    bail,
    Result,
};
use async_trait::async_trait;
use chrono::{
    DateTime,
    Utc,
};
use crate::common::{
    Bucket,
    Buckets,
    ClientFactory,
    ObjectPage,
    ObjectRecord,
    StorageClient,
};
use crate::cost::{
    CostQuery,
    CostService,
};
use std::collections::{
    HashMap,
    HashSet,
};
use std::sync::atomic::{
    AtomicUsize,
    Ordering,
};
use std::sync::{
    Arc,
    Mutex,
};
use std::time::Duration;

// Small pages so that most tests exercise pagination.
const MOCK_PAGE_SIZE: usize = 2;

/// Build an `ObjectRecord` modified `secs` after the epoch.
pub fn object(size: u64, class: &str, secs: i64) -> ObjectRecord {
    ObjectRecord {
        size_bytes:    size,
        last_modified: DateTime::<Utc>::from_timestamp(secs, 0),
        storage_class: class.into(),
    }
}

/// The contents of a fake S3 account.
#[derive(Debug, Default)]
pub struct MockWorld {
    pub buckets:    Buckets,
    regions:        HashMap<String, String>,
    objects:        HashMap<String, Vec<ObjectRecord>>,
    failing_pages:  HashMap<String, usize>,
    list_fails:     bool,
    panics:         HashSet<String>,
    region_lookups: AtomicUsize,
}

impl MockWorld {
    /// Add a bucket in `region` holding `objects`.
    pub fn with_bucket(
        mut self,
        name: &str,
        region: &str,
        objects: Vec<ObjectRecord>,
    ) -> Self {
        self.buckets.push(Bucket::new(name, None));
        self.regions.insert(name.into(), region.into());
        self.objects.insert(name.into(), objects);
        self
    }

    /// Add a bucket whose location can't be looked up.
    pub fn with_bucket_without_region(mut self, name: &str) -> Self {
        self.buckets.push(Bucket::new(name, None));
        self
    }

    /// Make listing page `page` (from zero) of `name` fail.
    pub fn with_failing_page(mut self, name: &str, page: usize) -> Self {
        self.failing_pages.insert(name.into(), page);
        self
    }

    /// Make `ListBuckets` fail.
    pub fn with_list_failure(mut self) -> Self {
        self.list_fails = true;
        self
    }

    /// Make listing `name` panic.
    pub fn with_panic(mut self, name: &str) -> Self {
        self.panics.insert(name.into());
        self
    }

    /// Number of location lookups made so far.
    pub fn region_lookups(&self) -> usize {
        self.region_lookups.load(Ordering::SeqCst)
    }
}

/// A fake S3 client bound to a single region.
#[derive(Debug)]
pub struct MockClient {
    world:  Arc<MockWorld>,
    region: String,
}

impl MockClient {
    pub fn new(world: Arc<MockWorld>, region: &str) -> Self {
        Self {
            world:  world,
            region: region.into(),
        }
    }

    pub fn region(&self) -> &str {
        &self.region
    }
}

#[async_trait]
impl StorageClient for MockClient {
    async fn list_buckets(&self) -> Result<Buckets> {
        if self.world.list_fails {
            bail!("AccessDenied listing buckets");
        }

        Ok(self.world.buckets.clone())
    }

    async fn bucket_region(&self, bucket: &str) -> Result<String> {
        self.world.region_lookups.fetch_add(1, Ordering::SeqCst);
        tokio::task::yield_now().await;

        match self.world.regions.get(bucket) {
            Some(region) => Ok(region.clone()),
            None         => bail!("AccessDenied for '{}'", bucket),
        }
    }

    async fn list_objects(
        &self,
        bucket: &str,
        token: Option<String>,
    ) -> Result<ObjectPage> {
        // Like S3, listing only works through a client in the bucket's
        // region.
        match self.world.regions.get(bucket) {
            Some(region) if *region == self.region => {},
            _ => bail!("PermanentRedirect for '{}' from '{}'", bucket, self.region),
        }

        if self.world.panics.contains(bucket) {
            panic!("listing '{}' blew up", bucket);
        }

        let page = match token {
            Some(token) => token.parse::<usize>()?,
            None        => 0,
        };

        if self.world.failing_pages.get(bucket) == Some(&page) {
            bail!("InternalError listing '{}'", bucket);
        }

        tokio::task::yield_now().await;

        let objects = self.world.objects
            .get(bucket)
            .map(|o| o.as_slice())
            .unwrap_or_default();

        let chunks: Vec<&[ObjectRecord]> = objects
            .chunks(MOCK_PAGE_SIZE)
            .collect();

        let next_token = if page + 1 < chunks.len() {
            Some((page + 1).to_string())
        }
        else {
            None
        };

        Ok(ObjectPage {
            objects:    chunks.get(page).map(|c| c.to_vec()).unwrap_or_default(),
            next_token: next_token,
        })
    }
}

/// Creates `MockClient`s and counts how often it was asked to.
#[derive(Debug)]
pub struct MockFactory {
    world:    Arc<MockWorld>,
    delay:    Duration,
    failures: Mutex<HashMap<String, usize>>,
    attempts: AtomicUsize,
    created:  AtomicUsize,
}

impl MockFactory {
    pub fn new(world: MockWorld) -> Self {
        Self::from_world(Arc::new(world))
    }

    pub fn from_world(world: Arc<MockWorld>) -> Self {
        Self {
            world:    world,
            delay:    Duration::ZERO,
            failures: Mutex::new(HashMap::new()),
            attempts: AtomicUsize::new(0),
            created:  AtomicUsize::new(0),
        }
    }

    /// Sleep for `delay` in every creation, widening race windows.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Fail the first `count` creations for `region`.
    pub fn with_failures(self, region: &str, count: usize) -> Self {
        self.failures.lock().unwrap().insert(region.into(), count);
        self
    }

    pub fn world(&self) -> Arc<MockWorld> {
        self.world.clone()
    }

    /// Number of creations attempted.
    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }

    /// Number of clients successfully created.
    pub fn created(&self) -> usize {
        self.created.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ClientFactory for MockFactory {
    type Client = MockClient;

    async fn create(&self, region: &str) -> Result<MockClient> {
        self.attempts.fetch_add(1, Ordering::SeqCst);

        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        {
            let mut failures = self.failures.lock().unwrap();

            if let Some(left) = failures.get_mut(region) {
                if *left > 0 {
                    *left -= 1;
                    bail!("InvalidRegion '{}'", region);
                }
            }
        }

        self.created.fetch_add(1, Ordering::SeqCst);

        Ok(MockClient::new(self.world.clone(), region))
    }
}

/// A fake Cost Explorer keyed by tag value.
#[derive(Debug, Default)]
pub struct MockCost {
    amounts:  HashMap<String, Vec<f64>>,
    failures: HashSet<String>,
    queries:  Arc<Mutex<Vec<CostQuery>>>,
}

impl MockCost {
    /// Monthly amounts returned for buckets tagged `bucket`.
    pub fn with_amounts(mut self, bucket: &str, amounts: Vec<f64>) -> Self {
        self.amounts.insert(bucket.into(), amounts);
        self
    }

    /// Fail every query for `bucket`.
    pub fn with_failure(mut self, bucket: &str) -> Self {
        self.failures.insert(bucket.into());
        self
    }

    /// Every query received, shared so it can be checked after the
    /// `MockCost` has been moved into a collector.
    pub fn queries(&self) -> Arc<Mutex<Vec<CostQuery>>> {
        self.queries.clone()
    }
}

#[async_trait]
impl CostService for MockCost {
    async fn period_amounts(&self, query: &CostQuery) -> Result<Vec<f64>> {
        self.queries.lock().unwrap().push(query.clone());

        if self.failures.contains(&query.tag_value) {
            bail!("DataUnavailableException for '{}'", query.tag_value);
        }

        Ok(self.amounts
            .get(&query.tag_value)
            .cloned()
            .unwrap_or_default())
    }
}
