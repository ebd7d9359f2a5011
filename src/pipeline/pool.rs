// EnrichmentWorkerPool: fan buckets out to workers and collect the outcomes
#![forbid(unsafe_code)]
#![deny(missing_docs)]
use crate::common::{
    accepts,
    Bucket,
    Buckets,
    ClientFactory,
    FilterField,
    FilterPredicate,
    MetricsFailurePolicy,
};
use crate::cost::CostCollector;
use futures::future::join_all;
use std::sync::Arc;
use std::time::Duration;
use super::{
    ClientRegistry,
    MetricsCollector,
    Outcome,
    PipelineError,
    RegionResolver,
    ResultSink,
    RunReport,
    SkipReason,
};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{
    debug,
    warn,
};

// Holds the whole batch from the start.
type JobQueue = Arc<Mutex<std::vec::IntoIter<Bucket>>>;

/// Everything a run needs to enrich buckets.
pub struct Stages<F: ClientFactory> {
    /// Region of `default_client`.
    pub default_region: String,

    /// Client for the default region, used for location lookups and seeded
    /// into the run's `ClientRegistry`.
    pub default_client: Arc<F::Client>,

    /// Creates clients for every other region.
    pub factory: Arc<F>,

    /// Optional inclusion filter. Name filters run before any AWS call,
    /// storage class filters once metrics are known.
    pub filter: Option<FilterPredicate>,

    /// Cost collection, if requested.
    pub cost: Option<CostCollector>,

    /// Timeout applied to each AWS call.
    pub call_timeout: Duration,

    /// Handling of buckets whose metrics couldn't be collected.
    pub metrics_failure: MetricsFailurePolicy,
}

// The per-run state shared by all workers.
struct Enricher<F: ClientFactory> {
    registry:        ClientRegistry<F>,
    resolver:        RegionResolver<F::Client>,
    metrics:         MetricsCollector,
    filter:          Option<FilterPredicate>,
    cost:            Option<CostCollector>,
    metrics_failure: MetricsFailurePolicy,
}

impl<F: ClientFactory> Enricher<F> {
    fn new(stages: Stages<F>) -> Self {
        // A fresh registry each run, so nothing leaks between runs.
        let registry = ClientRegistry::new(stages.factory, stages.call_timeout);
        registry.seed(&stages.default_region, stages.default_client.clone());

        Self {
            registry:        registry,
            resolver:        RegionResolver::new(
                stages.default_client,
                stages.call_timeout,
            ),
            metrics:         MetricsCollector::new(stages.call_timeout),
            filter:          stages.filter,
            cost:            stages.cost,
            metrics_failure: stages.metrics_failure,
        }
    }

    fn filter_for(&self, field: FilterField) -> Option<&FilterPredicate> {
        self.filter
            .as_ref()
            .filter(|f| f.field() == field)
    }

    fn rejects(&self, field: FilterField, bucket: &Bucket) -> bool {
        let rejected = !accepts(self.filter_for(field), bucket);

        if rejected {
            debug!("enrich: '{}' rejected by {} filter", bucket.name, field);
        }

        rejected
    }

    // Runs the stages for one bucket. The bucket is owned by this call until
    // it is returned inside the outcome.
    async fn enrich(&self, mut bucket: Bucket) -> Outcome {
        if self.rejects(FilterField::Name, &bucket) {
            return Outcome::skipped(bucket, SkipReason::FilteredByName);
        }

        // Nothing region scoped can happen until we know the region.
        let region = match self.resolver.resolve(&bucket.name).await {
            Ok(region) => region,
            Err(e)     => {
                warn!("Skipping bucket '{}': {}", bucket.name, e);

                return Outcome::skipped(bucket, SkipReason::Failed(e));
            },
        };

        bucket.region = Some(region.clone());

        let client = match self.registry.get_or_create(&region).await {
            Ok(client) => client,
            Err(e)     => {
                warn!("Skipping bucket '{}': {}", bucket.name, e);

                return Outcome::skipped(bucket, SkipReason::Failed(e));
            },
        };

        let mut reasons = Vec::new();

        let have_metrics = match self.metrics.collect(client.as_ref(), &bucket.name).await {
            Ok(metrics) => {
                metrics.apply(&mut bucket);
                true
            },
            Err(e) => match self.metrics_failure {
                MetricsFailurePolicy::Drop => {
                    warn!("Skipping bucket '{}': {}", bucket.name, e);

                    return Outcome::skipped(bucket, SkipReason::Failed(e));
                },
                MetricsFailurePolicy::Keep => {
                    warn!("Keeping bucket '{}' without metrics: {}", bucket.name, e);

                    reasons.push(e);
                    false
                },
            },
        };

        if self.rejects(FilterField::StorageClasses, &bucket) {
            return Outcome::skipped(bucket, SkipReason::FilteredByStorageClass);
        }

        // Cost is only worth asking for a bucket we could actually look at.
        if let (true, Some(cost)) = (have_metrics, self.cost.as_ref()) {
            match cost.collect(&bucket.name).await {
                Ok(amount) => bucket.cost = Some(amount),
                Err(e)     => {
                    warn!("No cost for bucket '{}': {}", bucket.name, e);

                    reasons.push(e);
                },
            }
        }

        if reasons.is_empty() {
            Outcome::Accepted(bucket)
        }
        else {
            Outcome::Degraded {
                bucket:  bucket,
                reasons: reasons,
            }
        }
    }
}

// Pull jobs until the queue is exhausted.
async fn worker<F: ClientFactory>(
    id: usize,
    jobs: JobQueue,
    enricher: Arc<Enricher<F>>,
    sink: Arc<ResultSink>,
) {
    debug!("worker {}: starting", id);

    loop {
        let job = jobs.lock().await.next();

        let bucket = match job {
            Some(bucket) => bucket,
            None         => break,
        };

        debug!("worker {}: enriching '{}'", id, bucket.name);

        let outcome = enricher.enrich(bucket).await;
        sink.push(outcome);
    }

    debug!("worker {}: queue drained", id);
}

/// Enrich `buckets` using `workers` concurrent workers.
///
/// Returns once every bucket has an outcome. Per-bucket failures are recorded
/// in the returned `RunReport`; only an invalid worker count or a panicking
/// worker fail the run.
pub async fn run<F>(
    buckets: Buckets,
    workers: usize,
    stages: Stages<F>,
) -> Result<RunReport, PipelineError>
where
    F: ClientFactory + 'static,
{
    if workers < 1 {
        return Err(PipelineError::InvalidWorkerCount(workers));
    }

    let total = buckets.len();

    debug!("run: Enriching {} buckets with {} workers", total, workers);

    // Every bucket is queued before any worker starts.
    let jobs: JobQueue = Arc::new(Mutex::new(buckets.into_iter()));
    let enricher = Arc::new(Enricher::new(stages));
    let sink = Arc::new(ResultSink::with_capacity(total));

    let handles: Vec<JoinHandle<()>> = (0..workers)
        .map(|id| {
            tokio::spawn(worker(
                id,
                jobs.clone(),
                enricher.clone(),
                sink.clone(),
            ))
        })
        .collect();

    for result in join_all(handles).await {
        if let Err(e) = result {
            return Err(PipelineError::WorkerPanicked(e.to_string()));
        }
    }

    debug!("run: Clients created for {:?}", enricher.registry.regions());

    Ok(RunReport::new(sink.take()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::{
        CostOptions,
        EnrichError,
    };
    use crate::mock::{
        object,
        MockClient,
        MockCost,
        MockFactory,
        MockWorld,
    };
    use pretty_assertions::assert_eq;

    const DEFAULT_REGION: &str = "ap-southeast-2";
    const TIMEOUT: Duration = Duration::from_secs(5);

    fn stages(factory: Arc<MockFactory>) -> Stages<MockFactory> {
        let client = MockClient::new(factory.world(), DEFAULT_REGION);

        Stages {
            default_region:  DEFAULT_REGION.into(),
            default_client:  Arc::new(client),
            factory:         factory,
            filter:          None,
            cost:            None,
            call_timeout:    TIMEOUT,
            metrics_failure: MetricsFailurePolicy::Keep,
        }
    }

    fn names(report: &RunReport) -> Vec<&str> {
        report.accepted()
            .iter()
            .map(|b| b.name.as_str())
            .collect()
    }

    // A dozen buckets spread over regions, including failures.
    fn busy_world() -> MockWorld {
        let regions = ["us-east-1", "eu-west-1", "ap-southeast-2"];
        let mut world = MockWorld::default();

        for i in 0..12 {
            let name = format!("bucket-{:02}", i);

            world = match i {
                3 | 8 => world.with_bucket_without_region(&name),
                _     => {
                    let objects = (0..i)
                        .map(|n| {
                            let class = if n % 3 == 0 { "GLACIER" } else { "STANDARD" };
                            object(n * 10, class, n as i64)
                        })
                        .collect();

                    world.with_bucket(&name, regions[i as usize % 3], objects)
                },
            };
        }

        world.with_failing_page("bucket-07", 1)
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_run_scenario() {
        let world = MockWorld::default()
            .with_bucket_without_region("A")
            .with_bucket("B", "us-east-1", vec![
                object(1_000, "STANDARD", 10),
                object(3_000, "GLACIER",  20),
            ])
            .with_bucket("C", "eu-west-1", vec![
                object(5, "STANDARD", 30),
            ]);

        let factory = Arc::new(MockFactory::new(world));
        let buckets = factory.world().buckets.clone();

        let report = run(buckets, 3, stages(factory.clone()))
            .await
            .unwrap();

        assert_eq!(factory.created(), 2);
        assert_eq!(names(&report), vec!["B", "C"]);

        let expected = Outcome::Skipped {
            name:   "A".into(),
            reason: SkipReason::Failed(EnrichError::RegionLookup(
                "AccessDenied for 'A'".into(),
            )),
        };
        assert_eq!(report.outcome("A"), Some(&expected));

        let accepted = report.accepted();

        assert_eq!(accepted[0].region.as_deref(), Some("us-east-1"));
        assert_eq!(accepted[0].object_count, 2);
        assert_eq!(accepted[0].size_bytes, 4_000);
        assert_eq!(accepted[0].storage_classes.get("GLACIER"), Some(&50.0));

        assert_eq!(accepted[1].region.as_deref(), Some("eu-west-1"));
        assert_eq!(accepted[1].object_count, 1);
        assert_eq!(accepted[1].size_bytes, 5);
        assert!(accepted[1].cost.is_none());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_run_is_deterministic_across_worker_counts() {
        let mut reports = Vec::new();

        for workers in 1..=12 {
            let factory = Arc::new(
                MockFactory::new(busy_world())
                    .with_delay(Duration::from_millis(2)),
            );
            let buckets = factory.world().buckets.clone();

            let report = run(buckets, workers, stages(factory.clone()))
                .await
                .unwrap();

            // The default region is seeded, the other two are created once.
            assert_eq!(factory.created(), 2, "workers = {}", workers);

            reports.push(report);
        }

        let first = &reports[0];

        assert_eq!(first.outcomes().len(), 12);
        assert_eq!(first.skipped_count(), 2);
        assert_eq!(first.degraded_count(), 1);

        for report in &reports[1..] {
            assert_eq!(report, first);
        }
    }

    #[tokio::test]
    async fn test_run_rejects_zero_workers() {
        let factory = Arc::new(MockFactory::new(MockWorld::default()));

        let ret = run(Buckets::new(), 0, stages(factory)).await;

        assert!(matches!(ret, Err(PipelineError::InvalidWorkerCount(0))));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_run_reports_panicking_worker() {
        let world = MockWorld::default()
            .with_bucket("fine", "ap-southeast-2", vec![object(1, "STANDARD", 1)])
            .with_bucket("cursed", "ap-southeast-2", vec![object(1, "STANDARD", 1)])
            .with_panic("cursed");

        let factory = Arc::new(MockFactory::new(world));
        let buckets = factory.world().buckets.clone();

        let ret = run(buckets, 2, stages(factory)).await;

        match ret {
            Err(PipelineError::WorkerPanicked(message)) => {
                assert!(message.contains("panicked"), "{}", message);
            },
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_run_empty_catalog() {
        let factory = Arc::new(MockFactory::new(MockWorld::default()));

        let report = run(Buckets::new(), 4, stages(factory.clone()))
            .await
            .unwrap();

        assert!(report.outcomes().is_empty());
        assert_eq!(factory.created(), 0);
    }

    #[tokio::test]
    async fn test_name_filter_runs_before_region_lookup() {
        let world = MockWorld::default()
            .with_bucket("prod-logs", "us-east-1", Vec::new())
            .with_bucket("prod-data", "us-east-1", Vec::new())
            .with_bucket("dev-logs", "us-east-1", Vec::new());

        let factory = Arc::new(MockFactory::new(world));
        let buckets = factory.world().buckets.clone();

        let mut stages = stages(factory.clone());
        stages.filter = Some(
            FilterPredicate::new(FilterField::Name, "^prod-").unwrap(),
        );

        let report = run(buckets, 2, stages).await.unwrap();

        assert_eq!(names(&report), vec!["prod-data", "prod-logs"]);
        assert_eq!(factory.world().region_lookups(), 2);
        assert_eq!(
            report.outcome("dev-logs"),
            Some(&Outcome::Skipped {
                name:   "dev-logs".into(),
                reason: SkipReason::FilteredByName,
            }),
        );
    }

    #[tokio::test]
    async fn test_storage_class_filter() {
        let mut objects = vec![object(1, "GLACIER", 1)];
        objects.extend((0..9).map(|i| object(1, "STANDARD", i)));

        let world = MockWorld::default()
            .with_bucket("archive", "eu-west-1", objects)
            .with_bucket("hot", "eu-west-1", vec![object(1, "STANDARD", 1)]);

        let factory = Arc::new(MockFactory::new(world));
        let buckets = factory.world().buckets.clone();

        let mut stages = stages(factory.clone());
        stages.filter = Some(
            FilterPredicate::new(FilterField::StorageClasses, "GLACIER").unwrap(),
        );

        let report = run(buckets, 2, stages).await.unwrap();

        assert_eq!(names(&report), vec!["archive"]);

        let archive = report.accepted()[0];
        assert_eq!(archive.storage_classes.get("GLACIER"), Some(&10.0));
        assert_eq!(archive.storage_classes.get("STANDARD"), Some(&90.0));
    }

    #[tokio::test]
    async fn test_metrics_failure_policies() {
        let world = || {
            MockWorld::default()
                .with_bucket("flaky", "eu-west-1", vec![
                    object(1, "STANDARD", 1),
                    object(1, "STANDARD", 2),
                    object(1, "STANDARD", 3),
                ])
                .with_failing_page("flaky", 1)
        };

        // Keep: zeroed metrics, no cost attempted.
        let cost = MockCost::default().with_amounts("flaky", vec![1.0]);
        let queries = cost.queries();
        let factory = Arc::new(MockFactory::new(world()));
        let buckets = factory.world().buckets.clone();

        let mut keep = stages(factory.clone());
        keep.cost = Some(CostCollector::new(
            Arc::new(cost),
            CostOptions::default(),
            TIMEOUT,
        ));

        let report = run(buckets, 1, keep).await.unwrap();

        let expected = Outcome::Degraded {
            bucket: Bucket {
                name:   "flaky".into(),
                region: Some("eu-west-1".into()),
                ..Default::default()
            },
            reasons: vec![EnrichError::Metrics(
                "listing page 2: InternalError listing 'flaky'".into(),
            )],
        };

        assert_eq!(report.outcomes(), &[expected]);
        assert!(queries.lock().unwrap().is_empty());

        // Drop: skipped entirely.
        let factory = Arc::new(MockFactory::new(world()));
        let buckets = factory.world().buckets.clone();

        let mut dropping = stages(factory.clone());
        dropping.metrics_failure = MetricsFailurePolicy::Drop;

        let report = run(buckets, 1, dropping).await.unwrap();

        assert!(report.accepted().is_empty());
        assert_eq!(report.skipped_count(), 1);
    }

    #[tokio::test]
    async fn test_cost_collected_and_degraded() {
        let world = MockWorld::default()
            .with_bucket("billed", "us-east-1", vec![object(1, "STANDARD", 1)])
            .with_bucket("unbilled", "us-east-1", vec![object(1, "STANDARD", 1)]);

        let cost = MockCost::default()
            .with_amounts("billed", vec![10.0, 2.5])
            .with_failure("unbilled");

        let factory = Arc::new(MockFactory::new(world));
        let buckets = factory.world().buckets.clone();

        let mut stages = stages(factory.clone());
        stages.cost = Some(CostCollector::new(
            Arc::new(cost),
            CostOptions::default(),
            TIMEOUT,
        ));

        let report = run(buckets, 2, stages).await.unwrap();

        assert_eq!(names(&report), vec!["billed", "unbilled"]);
        assert_eq!(report.accepted()[0].cost, Some(12.5));
        assert_eq!(report.accepted()[1].cost, None);

        match report.outcome("unbilled") {
            Some(Outcome::Degraded { reasons, .. }) => {
                assert_eq!(reasons, &vec![EnrichError::Cost(
                    "DataUnavailableException for 'unbilled'".into(),
                )]);
            },
            other => panic!("unexpected outcome: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_client_init_failure_skips_bucket() {
        let world = MockWorld::default()
            .with_bucket("far", "me-south-1", Vec::new())
            .with_bucket("near", "us-east-1", Vec::new());

        let factory = Arc::new(
            MockFactory::new(world).with_failures("me-south-1", 1),
        );
        let buckets = factory.world().buckets.clone();

        let report = run(buckets, 1, stages(factory.clone())).await.unwrap();

        assert_eq!(names(&report), vec!["near"]);

        let expected = Outcome::Skipped {
            name:   "far".into(),
            reason: SkipReason::Failed(EnrichError::ClientInit {
                region: "me-south-1".into(),
                reason: "InvalidRegion 'me-south-1'".into(),
            }),
        };
        assert_eq!(report.outcome("far"), Some(&expected));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_one_client_per_region_with_many_workers() {
        let mut world = MockWorld::default();

        for i in 0..20 {
            world = world.with_bucket(
                &format!("bucket-{:02}", i),
                "eu-west-1",
                vec![object(1, "STANDARD", 1)],
            );
        }

        let factory = Arc::new(
            MockFactory::new(world).with_delay(Duration::from_millis(10)),
        );
        let buckets = factory.world().buckets.clone();

        let report = run(buckets, 8, stages(factory.clone())).await.unwrap();

        assert_eq!(report.accepted().len(), 20);
        assert_eq!(factory.attempts(), 1);
        assert_eq!(factory.created(), 1);
    }
}
