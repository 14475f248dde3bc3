//! Cluster representatives: arithmetic-mean centroids and medoid clustroids.

use std::collections::BTreeMap;

use super::config::MeanDenominator;
use super::context::ClusteringContext;
use crate::types::FeatureVector;

/// The point a cluster is assigned around.
#[derive(Debug, Clone)]
pub enum Representative {
    /// A real input point, by index. Used for seeds and clustroids.
    Member(usize),
    /// A synthetic mean point (Euclidean only).
    Centroid(FeatureVector),
}

impl Representative {
    /// Resolve to the vector this representative stands for.
    pub fn vector<'a>(&'a self, points: &'a [FeatureVector]) -> &'a FeatureVector {
        match self {
            Self::Member(i) => &points[*i],
            Self::Centroid(v) => v,
        }
    }

    /// Identity of the representative when it is an input point.
    pub fn identity<'a>(&'a self, points: &'a [FeatureVector]) -> Option<&'a str> {
        match self {
            Self::Member(i) => points[*i].identity(),
            Self::Centroid(_) => None,
        }
    }
}

/// Compute the representative of a non-empty cluster under the context's metric.
pub fn recenter(
    ctx: &mut ClusteringContext,
    points: &[FeatureVector],
    members: &[usize],
) -> Representative {
    if ctx.metric().is_additive() {
        Representative::Centroid(mean_centroid(points, members, ctx.mean_denominator()))
    } else {
        Representative::Member(clustroid(ctx, points, members))
    }
}

/// Per-feature arithmetic mean over the union of member feature names.
pub fn mean_centroid(
    points: &[FeatureVector],
    members: &[usize],
    denominator: MeanDenominator,
) -> FeatureVector {
    let mut sums: BTreeMap<&str, (f64, usize)> = BTreeMap::new();
    for &i in members {
        for (name, &value) in points[i].features() {
            let entry = sums.entry(name.as_str()).or_insert((0.0, 0));
            entry.0 += value;
            entry.1 += 1;
        }
    }
    let size = members.len().max(1) as f64;
    let features = sums
        .into_iter()
        .map(|(name, (sum, present))| {
            let divisor = match denominator {
                MeanDenominator::ClusterSize => size,
                MeanDenominator::PresentMembers => present as f64,
            };
            (name.to_string(), sum / divisor)
        })
        .collect();
    FeatureVector::synthetic(features)
}

/// The member with the lowest average distance to all members (itself included).
///
/// Ties keep the first member scanned. O(n²) distance lookups per call.
pub fn clustroid(ctx: &mut ClusteringContext, points: &[FeatureVector], members: &[usize]) -> usize {
    debug_assert!(!members.is_empty(), "clustroid of an empty cluster");
    let size = members.len() as f64;
    let mut best = members[0];
    let mut best_avg = f64::INFINITY;
    for &p in members {
        let total: f64 = members
            .iter()
            .map(|&q| ctx.distance(&points[p], &points[q]))
            .sum();
        let avg = total / size;
        if avg < best_avg {
            best_avg = avg;
            best = p;
        }
    }
    best
}
