//! The partition handed back to callers.

use std::collections::BTreeMap;

use super::lloyd::LloydRun;
use crate::metric::DistanceMetric;
use crate::types::FeatureVector;

/// Winning partition of a clustering invocation.
#[derive(Debug, Clone)]
pub struct ClusteringResult {
    /// Number of clusters.
    pub k: usize,
    /// Metric the partition was computed under.
    pub metric: DistanceMetric,
    /// Mean distance from every point to its cluster's representative.
    pub distortion: f64,
    /// Cluster index -> member vectors, in input order.
    pub clusters: BTreeMap<usize, Vec<FeatureVector>>,
    /// Cluster index -> identity of its clustroid, `None` for synthetic centroids.
    pub representatives: BTreeMap<usize, Option<String>>,
}

impl ClusteringResult {
    /// Materialize the members of a run.
    pub fn from_run(run: &LloydRun, points: &[FeatureVector], metric: DistanceMetric) -> Self {
        let clusters = run
            .clusters()
            .into_iter()
            .map(|cluster| {
                let members = cluster.members.iter().map(|&i| points[i].clone()).collect();
                (cluster.representative, members)
            })
            .collect();
        let representatives = run
            .representatives
            .iter()
            .enumerate()
            .map(|(i, rep)| (i, rep.identity(points).map(str::to_string)))
            .collect();
        Self {
            k: run.k,
            metric,
            distortion: run.distortion,
            clusters,
            representatives,
        }
    }

    /// Member count per cluster index.
    pub fn sizes(&self) -> Vec<(usize, usize)> {
        self.clusters
            .iter()
            .map(|(&index, members)| (index, members.len()))
            .collect()
    }

    /// Total number of clustered points.
    pub fn point_count(&self) -> usize {
        self.clusters.values().map(Vec::len).sum()
    }

    /// Cluster index containing the point with this identity.
    pub fn cluster_of(&self, identity: &str) -> Option<usize> {
        self.clusters.iter().find_map(|(&index, members)| {
            members
                .iter()
                .any(|v| v.identity() == Some(identity))
                .then_some(index)
        })
    }
}
