// Per-bucket outcomes, the ResultSink and the RunReport
#![forbid(unsafe_code)]
#![deny(missing_docs)]
use crate::common::{
    Bucket,
    Buckets,
    EnrichError,
};
use std::fmt;
use std::sync::{
    Mutex,
    PoisonError,
};

/// Why a bucket was left out of the results.
#[derive(Clone, Debug, PartialEq)]
pub enum SkipReason {
    /// The name filter rejected it.
    FilteredByName,

    /// The storage class filter rejected it.
    FilteredByStorageClass,

    /// A stage failed in a way that leaves nothing useful to report.
    Failed(EnrichError),
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::FilteredByName         => write!(f, "filtered by name"),
            Self::FilteredByStorageClass => write!(f, "filtered by storage class"),
            Self::Failed(e)              => write!(f, "{}", e),
        }
    }
}

/// The result of enriching a single bucket.
#[derive(Clone, Debug, PartialEq)]
pub enum Outcome {
    /// Fully enriched and accepted by the filters.
    Accepted(Bucket),

    /// Accepted, but some stages failed and their fields are missing.
    Degraded {
        /// The partially enriched bucket.
        bucket: Bucket,

        /// The stages that failed.
        reasons: Vec<EnrichError>,
    },

    /// Left out of the results.
    Skipped {
        /// Name of the skipped bucket.
        name: String,

        /// Why it was skipped.
        reason: SkipReason,
    },
}

impl Outcome {
    /// Build a `Skipped` outcome for `bucket`.
    pub fn skipped(bucket: Bucket, reason: SkipReason) -> Self {
        Self::Skipped {
            name:   bucket.name,
            reason: reason,
        }
    }

    /// Name of the bucket this outcome is for.
    pub fn name(&self) -> &str {
        match self {
            Self::Accepted(bucket)        => &bucket.name,
            Self::Degraded { bucket, .. } => &bucket.name,
            Self::Skipped { name, .. }    => name,
        }
    }

    /// The bucket, if it made it into the results.
    pub fn bucket(&self) -> Option<&Bucket> {
        match self {
            Self::Accepted(bucket)        => Some(bucket),
            Self::Degraded { bucket, .. } => Some(bucket),
            Self::Skipped { .. }          => None,
        }
    }

    /// Take the bucket out, if it made it into the results.
    pub fn into_bucket(self) -> Option<Bucket> {
        match self {
            Self::Accepted(bucket)        => Some(bucket),
            Self::Degraded { bucket, .. } => Some(bucket),
            Self::Skipped { .. }          => None,
        }
    }
}

/// Append-only, thread-safe collection of outcomes.
///
/// Each worker pushes exactly one outcome per bucket it takes from the queue.
#[derive(Debug, Default)]
pub struct ResultSink {
    outcomes: Mutex<Vec<Outcome>>,
}

impl ResultSink {
    /// Return a new `ResultSink` with room for `capacity` outcomes.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            outcomes: Mutex::new(Vec::with_capacity(capacity)),
        }
    }

    /// Append an outcome.
    pub fn push(&self, outcome: Outcome) {
        self.outcomes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(outcome);
    }

    /// Take every outcome pushed so far, leaving the sink empty.
    pub fn take(&self) -> Vec<Outcome> {
        let mut outcomes = self.outcomes
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        std::mem::take(&mut *outcomes)
    }
}

/// Every outcome of a pipeline run, in bucket name order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RunReport {
    outcomes: Vec<Outcome>,
}

impl RunReport {
    /// Build a report from `outcomes` in any order.
    pub fn new(mut outcomes: Vec<Outcome>) -> Self {
        outcomes.sort_by(|a, b| a.name().cmp(b.name()));

        Self {
            outcomes: outcomes,
        }
    }

    /// All outcomes, sorted by bucket name.
    pub fn outcomes(&self) -> &[Outcome] {
        &self.outcomes
    }

    /// The outcome for the bucket called `name`.
    #[cfg(test)]
    pub fn outcome(&self, name: &str) -> Option<&Outcome> {
        self.outcomes
            .binary_search_by(|o| o.name().cmp(name))
            .ok()
            .map(|i| &self.outcomes[i])
    }

    /// Accepted and degraded buckets, sorted by name.
    pub fn accepted(&self) -> Vec<&Bucket> {
        self.outcomes
            .iter()
            .filter_map(Outcome::bucket)
            .collect()
    }

    /// Consume the report, returning the accepted and degraded buckets.
    pub fn into_accepted(self) -> Buckets {
        self.outcomes
            .into_iter()
            .filter_map(Outcome::into_bucket)
            .collect()
    }

    /// Number of fully accepted buckets.
    pub fn accepted_count(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o, Outcome::Accepted(_)))
            .count()
    }

    /// Number of degraded buckets.
    pub fn degraded_count(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o, Outcome::Degraded { .. }))
            .count()
    }

    /// Number of skipped buckets.
    pub fn skipped_count(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o, Outcome::Skipped { .. }))
            .count()
    }
}
