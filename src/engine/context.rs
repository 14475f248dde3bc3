//! Per-run clustering state threaded through every engine step.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use super::cache::DistanceCache;
use super::config::MeanDenominator;
use crate::metric::DistanceMetric;
use crate::types::{ClusterError, ClusterResult, FeatureVector};

/// Active metric plus the cache filled under it. One per Lloyd run.
#[derive(Debug)]
pub struct ClusteringContext {
    metric: DistanceMetric,
    cache: DistanceCache,
    mean_denominator: MeanDenominator,
    deadline: Option<Instant>,
}

impl ClusteringContext {
    /// Create a context with a fresh cache.
    pub fn new(metric: DistanceMetric) -> Self {
        Self {
            metric,
            cache: DistanceCache::new(),
            mean_denominator: MeanDenominator::default(),
            deadline: None,
        }
    }

    /// Set the mean-centroid denominator policy.
    pub fn with_mean_denominator(mut self, denominator: MeanDenominator) -> Self {
        self.mean_denominator = denominator;
        self
    }

    /// Set the instant after which iterations fail with `DeadlineExceeded`.
    pub fn with_deadline(mut self, deadline: Option<Instant>) -> Self {
        self.deadline = deadline;
        self
    }

    /// Distance under the active metric, through the cache.
    pub fn distance(&mut self, a: &FeatureVector, b: &FeatureVector) -> f64 {
        self.cache.get_or_compute(self.metric, a, b)
    }

    /// The active metric.
    pub fn metric(&self) -> DistanceMetric {
        self.metric
    }

    /// The mean-centroid denominator policy.
    pub fn mean_denominator(&self) -> MeanDenominator {
        self.mean_denominator
    }

    /// The distance cache.
    pub fn cache(&self) -> &DistanceCache {
        &self.cache
    }

    /// Fail if the deadline has passed.
    pub fn check_deadline(&self) -> ClusterResult<()> {
        match self.deadline {
            Some(deadline) if Instant::now() >= deadline => Err(ClusterError::DeadlineExceeded),
            _ => Ok(()),
        }
    }
}

/// Cooperative cancellation flag, honored between restarts and between k candidates.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
}

impl CancelToken {
    /// Create a token that is not cancelled.
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation. Every clone observes it.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    /// Whether cancellation was requested.
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    /// Fail with `Cancelled` if cancellation was requested.
    pub fn check(&self) -> ClusterResult<()> {
        if self.is_cancelled() {
            Err(ClusterError::Cancelled)
        } else {
            Ok(())
        }
    }
}
