//! Engine configuration with JSON persistence.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::metric::DistanceMetric;
use crate::types::{
    ClusterResult, DEFAULT_ITERATIONS, DEFAULT_K_MAX, DEFAULT_K_MIN, DEFAULT_RESTARTS,
};

/// How the arithmetic-mean centroid divides a feature's accumulated sum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MeanDenominator {
    /// Divide by the cluster size, even when some members lack the feature.
    #[default]
    ClusterSize,
    /// Divide by the number of members carrying the feature.
    PresentMembers,
}

/// Complete engine configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClusterConfig {
    /// Distance metric for the whole run.
    pub metric: DistanceMetric,
    /// Fixed cluster count. `None` selects k with the elbow heuristic.
    pub k: Option<usize>,
    /// Smallest elbow candidate.
    pub k_min: usize,
    /// Largest elbow candidate.
    pub k_max: usize,
    /// Restarts after the first run, per candidate k.
    pub restarts: usize,
    /// Lloyd iterations per run.
    pub iterations: usize,
    /// Base random seed. `None` draws one from entropy per invocation.
    pub seed: Option<u64>,
    /// Stop a run once an iteration leaves every assignment unchanged.
    pub early_stop: bool,
    /// Wall-clock budget for the whole invocation, in milliseconds.
    pub deadline_ms: Option<u64>,
    /// Run restarts on the rayon thread pool.
    pub parallel: bool,
    /// Mean-centroid denominator policy (Euclidean only).
    pub mean_denominator: MeanDenominator,
}

impl Default for ClusterConfig {
    fn default() -> Self {
        Self {
            metric: DistanceMetric::Euclidean,
            k: None,
            k_min: DEFAULT_K_MIN,
            k_max: DEFAULT_K_MAX,
            restarts: DEFAULT_RESTARTS,
            iterations: DEFAULT_ITERATIONS,
            seed: None,
            early_stop: false,
            deadline_ms: None,
            parallel: true,
            mean_denominator: MeanDenominator::ClusterSize,
        }
    }
}

impl ClusterConfig {
    /// Load a configuration from a JSON file. Missing fields take their defaults.
    pub fn from_file(path: &Path) -> ClusterResult<Self> {
        let data = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&data)?)
    }

    /// Write this configuration as pretty-printed JSON.
    pub fn save(&self, path: &Path) -> ClusterResult<()> {
        let data = serde_json::to_string_pretty(self)?;
        std::fs::write(path, data)?;
        Ok(())
    }

    /// Set the distance metric.
    pub fn with_metric(mut self, metric: DistanceMetric) -> Self {
        self.metric = metric;
        self
    }

    /// Set a fixed k, or `None` for elbow selection.
    pub fn with_k(mut self, k: Option<usize>) -> Self {
        self.k = k;
        self
    }

    /// Set the elbow candidate range (inclusive).
    pub fn with_k_range(mut self, k_min: usize, k_max: usize) -> Self {
        self.k_min = k_min;
        self.k_max = k_max;
        self
    }

    /// Set the number of additional restarts per k.
    pub fn with_restarts(mut self, restarts: usize) -> Self {
        self.restarts = restarts;
        self
    }

    /// Set the Lloyd iteration budget.
    pub fn with_iterations(mut self, iterations: usize) -> Self {
        self.iterations = iterations;
        self
    }

    /// Set the random seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Enable or disable convergence early stop.
    pub fn with_early_stop(mut self, early_stop: bool) -> Self {
        self.early_stop = early_stop;
        self
    }

    /// Set the wall-clock deadline.
    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline_ms = Some(u64::try_from(deadline.as_millis()).unwrap_or(u64::MAX));
        self
    }

    /// Enable or disable parallel restarts.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Set the mean-centroid denominator policy.
    pub fn with_mean_denominator(mut self, denominator: MeanDenominator) -> Self {
        self.mean_denominator = denominator;
        self
    }

    /// Deadline as a duration, if set.
    pub fn deadline(&self) -> Option<Duration> {
        self.deadline_ms.map(Duration::from_millis)
    }

    /// Elbow candidates for `n` points: `[k_min, min(k_max, n)]`, never below 1.
    pub fn k_candidates(&self, n: usize) -> Vec<usize> {
        let lo = self.k_min.max(1);
        let hi = self.k_max.min(n);
        (lo..=hi).collect()
    }
}
