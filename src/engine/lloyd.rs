//! Lloyd iteration: alternate assignment and recentering for a fixed budget.

use rand::Rng;

use super::assign::{assign, reseed_empty, Assignment, Cluster};
use super::centroid::{recenter, Representative};
use super::context::ClusteringContext;
use crate::types::{ClusterError, ClusterResult, FeatureVector, DEFAULT_ITERATIONS};

/// Parameters for one Lloyd run.
#[derive(Debug, Clone, Copy)]
pub struct LloydParams {
    /// Number of clusters.
    pub k: usize,
    /// Recenter/assign rounds after the initial assignment.
    pub iterations: usize,
    /// Stop early once a round leaves every label unchanged.
    pub early_stop: bool,
}

impl LloydParams {
    /// Parameters for `k` clusters with the default iteration budget.
    pub fn new(k: usize) -> Self {
        Self {
            k,
            iterations: DEFAULT_ITERATIONS,
            early_stop: false,
        }
    }
}

/// Final partition of one Lloyd run.
#[derive(Debug, Clone)]
pub struct LloydRun {
    /// Number of clusters.
    pub k: usize,
    /// Mean distance from each point to its representative.
    pub distortion: f64,
    /// Last representatives, indexed by cluster.
    pub representatives: Vec<Representative>,
    /// Last assignment against `representatives`.
    pub assignment: Assignment,
    /// Rounds actually executed.
    pub iterations_run: usize,
    /// Empty clusters re-seeded over the whole run.
    pub reseeded: usize,
}

impl LloydRun {
    /// Clusters of the final assignment, by representative index.
    pub fn clusters(&self) -> Vec<Cluster> {
        self.assignment.clusters()
    }
}

/// Run Lloyd's algorithm once from `k` distinct randomly sampled seed points.
///
/// Accepts `1 <= k <= points.len()`.
pub fn run<R: Rng + ?Sized>(
    ctx: &mut ClusteringContext,
    points: &[FeatureVector],
    params: &LloydParams,
    rng: &mut R,
) -> ClusterResult<LloydRun> {
    let n = points.len();
    if n == 0 {
        return Err(ClusterError::EmptyInput);
    }
    if params.k == 0 || params.k > n {
        return Err(ClusterError::InvalidK {
            k: params.k,
            min: 1,
            max: n,
        });
    }

    let mut representatives: Vec<Representative> = rand::seq::index::sample(rng, n, params.k)
        .into_iter()
        .map(Representative::Member)
        .collect();

    let mut assignment = assign(ctx, points, &representatives);
    let mut reseeded = reseed_empty(ctx, points, &mut representatives, &mut assignment);

    let mut iterations_run = 0;
    for _ in 0..params.iterations {
        ctx.check_deadline()?;

        // Reseeding keeps every cluster non-empty, so the groups line up with the
        // representative indices.
        representatives = assignment
            .clusters()
            .iter()
            .map(|cluster| recenter(ctx, points, &cluster.members))
            .collect();

        let mut next = assign(ctx, points, &representatives);
        reseeded += reseed_empty(ctx, points, &mut representatives, &mut next);
        iterations_run += 1;

        let stable = next.labels == assignment.labels;
        assignment = next;
        if params.early_stop && stable {
            break;
        }
    }

    Ok(LloydRun {
        k: params.k,
        distortion: assignment.distortion(),
        representatives,
        assignment,
        iterations_run,
        reseeded,
    })
}
