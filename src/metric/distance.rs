//! Pluggable distance metrics over sparse feature vectors.

use std::cmp::Ordering;
use std::collections::btree_map;
use std::iter::Peekable;

use serde::{Deserialize, Serialize};

use super::edit::normalized_edit_distance;
use crate::types::{FeatureVector, NON_COMPARABLE_FEATURES};

/// The dissimilarity used for one clustering run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DistanceMetric {
    /// Root of summed squared differences over the union of feature names.
    #[default]
    Euclidean,
    /// `1 - cos(theta)`, dot product over shared names only.
    Cosine,
    /// Mean normalized edit distance of the shared textual features.
    Edit,
    /// `1 - |A ∩ B| / |A ∪ B|` over feature-name sets.
    Jaccard,
}

impl DistanceMetric {
    /// All metrics, in numeric-code order.
    pub const ALL: [DistanceMetric; 4] = [
        DistanceMetric::Euclidean,
        DistanceMetric::Cosine,
        DistanceMetric::Edit,
        DistanceMetric::Jaccard,
    ];

    /// Distance between two vectors. Non-negative and symmetric.
    pub fn distance(&self, a: &FeatureVector, b: &FeatureVector) -> f64 {
        match self {
            Self::Euclidean => euclidean_distance(a, b),
            Self::Cosine => cosine_distance(a, b),
            Self::Edit => edit_distance(a, b),
            Self::Jaccard => jaccard_distance(a, b),
        }
    }

    /// Whether a coordinate-wise mean is a valid representative under this metric.
    pub fn is_additive(&self) -> bool {
        matches!(self, Self::Euclidean)
    }

    /// Return a human-readable name for this metric.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Euclidean => "euclidean",
            Self::Cosine => "cosine",
            Self::Edit => "edit",
            Self::Jaccard => "jaccard",
        }
    }

    /// Parse a metric from its name or its legacy numeric code (0-3).
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_lowercase().as_str() {
            "euclidean" | "0" => Some(Self::Euclidean),
            "cosine" | "1" => Some(Self::Cosine),
            "edit" | "2" => Some(Self::Edit),
            "jaccard" | "3" => Some(Self::Jaccard),
            _ => None,
        }
    }
}

impl std::fmt::Display for DistanceMetric {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// One step of a sorted merge over two feature maps.
enum Joined {
    Both(f64, f64),
    Left(f64),
    Right(f64),
}

/// Walks the union of two feature maps in key order, independent of argument order.
struct MergeJoin<'a> {
    left: Peekable<btree_map::Iter<'a, String, f64>>,
    right: Peekable<btree_map::Iter<'a, String, f64>>,
}

impl<'a> MergeJoin<'a> {
    fn new(a: &'a FeatureVector, b: &'a FeatureVector) -> Self {
        Self {
            left: a.features().iter().peekable(),
            right: b.features().iter().peekable(),
        }
    }
}

impl Iterator for MergeJoin<'_> {
    type Item = Joined;

    fn next(&mut self) -> Option<Joined> {
        let order = match (self.left.peek(), self.right.peek()) {
            (None, None) => return None,
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (Some((ka, _)), Some((kb, _))) => ka.cmp(kb),
        };
        match order {
            Ordering::Less => self.left.next().map(|(_, &v)| Joined::Left(v)),
            Ordering::Greater => self.right.next().map(|(_, &v)| Joined::Right(v)),
            Ordering::Equal => match (self.left.next(), self.right.next()) {
                (Some((_, &va)), Some((_, &vb))) => Some(Joined::Both(va, vb)),
                _ => None,
            },
        }
    }
}

/// Euclidean distance; a dimension missing on one side counts as zero.
pub fn euclidean_distance(a: &FeatureVector, b: &FeatureVector) -> f64 {
    MergeJoin::new(a, b)
        .map(|step| match step {
            Joined::Both(x, y) => (x - y) * (x - y),
            Joined::Left(v) | Joined::Right(v) => v * v,
        })
        .sum::<f64>()
        .sqrt()
}

/// Dot product over the intersection of feature names.
pub fn dot_product(a: &FeatureVector, b: &FeatureVector) -> f64 {
    MergeJoin::new(a, b)
        .map(|step| match step {
            Joined::Both(x, y) => x * y,
            _ => 0.0,
        })
        .sum()
}

/// Cosine similarity, clamped to [-1, 1]. Zero when either vector has zero magnitude.
pub fn cosine_similarity(a: &FeatureVector, b: &FeatureVector) -> f64 {
    // sqrt(|a|² |b|²) is exactly |a|² for a == b, so self-similarity is exactly 1.
    let denom = (a.squared_norm() * b.squared_norm()).sqrt();
    if denom == 0.0 {
        0.0
    } else {
        (dot_product(a, b) / denom).clamp(-1.0, 1.0)
    }
}

/// Cosine distance `1 - cos(theta)`, in [0, 2].
pub fn cosine_distance(a: &FeatureVector, b: &FeatureVector) -> f64 {
    (1.0 - cosine_similarity(a, b)).max(0.0)
}

/// Mean normalized edit distance over comparable shared feature names.
///
/// Names whose texts are both empty are skipped; with nothing compared the distance is 0.
pub fn edit_distance(a: &FeatureVector, b: &FeatureVector) -> f64 {
    let mut total = 0.0;
    let mut count = 0usize;
    for name in a.feature_set().intersection(b.feature_set()) {
        if NON_COMPARABLE_FEATURES.contains(&name.as_str()) {
            continue;
        }
        let ta = a.features_text().get(name).map(String::as_str).unwrap_or("");
        let tb = b.features_text().get(name).map(String::as_str).unwrap_or("");
        if let Some(d) = normalized_edit_distance(ta, tb) {
            total += d;
            count += 1;
        }
    }
    if count == 0 {
        0.0
    } else {
        total / count as f64
    }
}

/// Jaccard distance over feature-name sets. Two empty sets are at distance 0.
pub fn jaccard_distance(a: &FeatureVector, b: &FeatureVector) -> f64 {
    let intersection = a.feature_set().intersection(b.feature_set()).count();
    let union = a.feature_set().len() + b.feature_set().len() - intersection;
    if union == 0 {
        return 0.0;
    }
    1.0 - intersection as f64 / union as f64
}
