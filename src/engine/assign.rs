//! Nearest-representative assignment and empty-cluster re-seeding.

use super::centroid::Representative;
use super::context::ClusteringContext;
use crate::types::FeatureVector;

/// A non-empty group of points sharing one representative.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cluster {
    /// Index of the representative the members were assigned to.
    pub representative: usize,
    /// Indices of member points, in input order.
    pub members: Vec<usize>,
}

/// Cluster label and distance to that cluster's representative, per point.
#[derive(Debug, Clone, PartialEq)]
pub struct Assignment {
    /// Cluster index for each point.
    pub labels: Vec<usize>,
    /// Distance from each point to its representative.
    pub distances: Vec<f64>,
    k: usize,
}

impl Assignment {
    /// Number of clusters the assignment was made against.
    pub fn k(&self) -> usize {
        self.k
    }

    /// Member count per cluster index.
    pub fn sizes(&self) -> Vec<usize> {
        let mut sizes = vec![0usize; self.k];
        for &label in &self.labels {
            sizes[label] += 1;
        }
        sizes
    }

    /// Group points by label. Empty clusters are omitted.
    pub fn clusters(&self) -> Vec<Cluster> {
        let mut groups: Vec<Vec<usize>> = vec![Vec::new(); self.k];
        for (point, &label) in self.labels.iter().enumerate() {
            groups[label].push(point);
        }
        groups
            .into_iter()
            .enumerate()
            .filter(|(_, members)| !members.is_empty())
            .map(|(representative, members)| Cluster {
                representative,
                members,
            })
            .collect()
    }

    /// Mean distance from each point to its representative.
    pub fn distortion(&self) -> f64 {
        if self.distances.is_empty() {
            return 0.0;
        }
        self.distances.iter().sum::<f64>() / self.distances.len() as f64
    }
}

/// Assign every point to its nearest representative. Ties go to the lowest index.
pub fn assign(
    ctx: &mut ClusteringContext,
    points: &[FeatureVector],
    representatives: &[Representative],
) -> Assignment {
    let mut labels = Vec::with_capacity(points.len());
    let mut distances = Vec::with_capacity(points.len());
    for point in points {
        let (label, distance) = nearest(ctx, point, points, representatives);
        labels.push(label);
        distances.push(distance);
    }
    Assignment {
        labels,
        distances,
        k: representatives.len(),
    }
}

/// Index of and distance to the nearest representative.
pub fn nearest(
    ctx: &mut ClusteringContext,
    point: &FeatureVector,
    points: &[FeatureVector],
    representatives: &[Representative],
) -> (usize, f64) {
    let mut best = 0;
    let mut best_dist = f64::INFINITY;
    for (i, rep) in representatives.iter().enumerate() {
        let d = ctx.distance(point, rep.vector(points));
        if d < best_dist {
            best_dist = d;
            best = i;
        }
    }
    (best, best_dist)
}

/// Fill every empty cluster with the point farthest from its own representative.
///
/// Only points in clusters with more than one member are eligible; ties keep the
/// first point. The moved point becomes the empty cluster's representative.
/// Returns the number of clusters re-seeded.
pub fn reseed_empty(
    ctx: &mut ClusteringContext,
    points: &[FeatureVector],
    representatives: &mut [Representative],
    assignment: &mut Assignment,
) -> usize {
    let mut sizes = assignment.sizes();
    let mut reseeded = 0;
    for empty in 0..sizes.len() {
        if sizes[empty] > 0 {
            continue;
        }
        let mut candidate: Option<usize> = None;
        let mut farthest = f64::NEG_INFINITY;
        for (point, &label) in assignment.labels.iter().enumerate() {
            if sizes[label] > 1 && (candidate.is_none() || assignment.distances[point] > farthest) {
                farthest = assignment.distances[point];
                candidate = Some(point);
            }
        }
        let Some(point) = candidate else {
            break;
        };
        log::debug!(
            "Re-seeding empty cluster {} with point {} (distance {:.4})",
            empty,
            point,
            farthest
        );
        sizes[assignment.labels[point]] -= 1;
        sizes[empty] = 1;
        representatives[empty] = Representative::Member(point);
        assignment.labels[point] = empty;
        assignment.distances[point] = ctx.distance(&points[point], &points[point]);
        reseeded += 1;
    }
    reseeded
}
