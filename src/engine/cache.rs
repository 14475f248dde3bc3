//! Pairwise distance memoization for one clustering run.

use std::collections::HashMap;
use std::sync::Arc;

use crate::metric::DistanceMetric;
use crate::types::FeatureVector;

/// Memoizes distances keyed by an unordered pair of identities.
///
/// A cache is only valid for the metric it was filled with. Vectors without an
/// identity (synthetic centroids) bypass it.
#[derive(Debug, Default)]
pub struct DistanceCache {
    entries: HashMap<(Arc<str>, Arc<str>), f64>,
    hits: u64,
    misses: u64,
}

impl DistanceCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached distance between `a` and `b`, computing and storing it on a miss.
    pub fn get_or_compute(
        &mut self,
        metric: DistanceMetric,
        a: &FeatureVector,
        b: &FeatureVector,
    ) -> f64 {
        let key = match (a.identity_key(), b.identity_key()) {
            (Some(ia), Some(ib)) => pair_key(ia, ib),
            _ => return metric.distance(a, b),
        };
        if let Some(&d) = self.entries.get(&key) {
            self.hits += 1;
            return d;
        }
        self.misses += 1;
        let d = metric.distance(a, b);
        self.entries.insert(key, d);
        d
    }

    /// Cached distance for a pair of identities, in either order.
    pub fn get(&self, a: &str, b: &str) -> Option<f64> {
        let key = pair_key(&Arc::from(a), &Arc::from(b));
        self.entries.get(&key).copied()
    }

    /// Drop every entry and reset the counters.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.hits = 0;
        self.misses = 0;
    }

    /// Number of cached pairs.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Lookups answered from the cache.
    pub fn hits(&self) -> u64 {
        self.hits
    }

    /// Lookups that had to compute the distance.
    pub fn misses(&self) -> u64 {
        self.misses
    }
}

fn pair_key(a: &Arc<str>, b: &Arc<str>) -> (Arc<str>, Arc<str>) {
    if a <= b {
        (Arc::clone(a), Arc::clone(b))
    } else {
        (Arc::clone(b), Arc::clone(a))
    }
}
