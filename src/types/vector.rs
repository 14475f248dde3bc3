//! The sparse feature vector clustered by the engine, and its builder.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use serde_json::{Map, Value};

/// Feature names that edit distance never compares.
pub const NON_COMPARABLE_FEATURES: &[&str] = &["resourceName"];

/// One item's sparse feature map.
///
/// All derived fields are computed once by [`FeatureVectorBuilder::build`] and are
/// read-only afterwards; the engine shares vectors by reference across restarts.
#[derive(Debug, Clone)]
pub struct FeatureVector {
    /// Stable unique key (path, URI). `None` for synthetic centroids.
    identity: Option<Arc<str>>,
    /// Feature name -> numeric magnitude.
    features: BTreeMap<String, f64>,
    /// Feature name -> raw stringified value (edit distance only).
    features_text: BTreeMap<String, String>,
    /// Names present in `features`.
    feature_set: BTreeSet<String>,
    /// Sum of squared feature values.
    squared_norm: f64,
    /// Raw attributes the vector was extracted from, echoed by the report.
    metadata: Option<Arc<Map<String, Value>>>,
}

impl FeatureVector {
    /// Build an identity-less vector, used for arithmetic-mean centroids.
    pub fn synthetic(features: BTreeMap<String, f64>) -> Self {
        Self::derive(None, features, BTreeMap::new(), None)
    }

    fn derive(
        identity: Option<Arc<str>>,
        features: BTreeMap<String, f64>,
        mut features_text: BTreeMap<String, String>,
        metadata: Option<Arc<Map<String, Value>>>,
    ) -> Self {
        for (name, value) in &features {
            features_text
                .entry(name.clone())
                .or_insert_with(|| format_magnitude(*value));
        }
        features_text.retain(|name, _| features.contains_key(name));
        let feature_set = features.keys().cloned().collect();
        let squared_norm = features.values().map(|v| v * v).sum::<f64>();
        Self {
            identity,
            features,
            features_text,
            feature_set,
            squared_norm,
            metadata,
        }
    }

    /// Stable identity of this item, if any.
    pub fn identity(&self) -> Option<&str> {
        self.identity.as_deref()
    }

    pub(crate) fn identity_key(&self) -> Option<&Arc<str>> {
        self.identity.as_ref()
    }

    /// Numeric feature map.
    pub fn features(&self) -> &BTreeMap<String, f64> {
        &self.features
    }

    /// Stringified feature map.
    pub fn features_text(&self) -> &BTreeMap<String, String> {
        &self.features_text
    }

    /// Set of feature names present on this vector.
    pub fn feature_set(&self) -> &BTreeSet<String> {
        &self.feature_set
    }

    /// Numeric value of a feature, if present.
    pub fn get(&self, name: &str) -> Option<f64> {
        self.features.get(name).copied()
    }

    /// Euclidean norm over all features.
    pub fn magnitude(&self) -> f64 {
        self.squared_norm.sqrt()
    }

    /// Sum of squared feature values.
    pub fn squared_norm(&self) -> f64 {
        self.squared_norm
    }

    /// Raw attributes this vector was built from.
    pub fn metadata(&self) -> Option<&Map<String, Value>> {
        self.metadata.as_deref()
    }

    /// Number of features.
    pub fn len(&self) -> usize {
        self.features.len()
    }

    /// Whether the vector has no features at all.
    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }
}

/// Render a magnitude the way it appears in `features_text` when no raw text is given.
fn format_magnitude(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{}", value)
    }
}

/// Builder for constructing FeatureVector instances ergonomically.
pub struct FeatureVectorBuilder {
    identity: Arc<str>,
    features: BTreeMap<String, f64>,
    features_text: BTreeMap<String, String>,
    metadata: Option<Arc<Map<String, Value>>>,
}

impl FeatureVectorBuilder {
    /// Create a new builder for the item with the given identity.
    pub fn new(identity: impl Into<Arc<str>>) -> Self {
        Self {
            identity: identity.into(),
            features: BTreeMap::new(),
            features_text: BTreeMap::new(),
            metadata: None,
        }
    }

    /// Set a numeric feature.
    pub fn feature(mut self, name: impl Into<String>, value: f64) -> Self {
        self.features.insert(name.into(), value);
        self
    }

    /// Set a numeric feature together with its raw text.
    pub fn text_feature(
        mut self,
        name: impl Into<String>,
        value: f64,
        text: impl Into<String>,
    ) -> Self {
        let name = name.into();
        self.features_text.insert(name.clone(), text.into());
        self.features.insert(name, value);
        self
    }

    /// Attach the raw attribute map.
    pub fn metadata(mut self, metadata: Map<String, Value>) -> Self {
        self.metadata = Some(Arc::new(metadata));
        self
    }

    /// Build the FeatureVector. Features without raw text get their formatted value.
    pub fn build(self) -> FeatureVector {
        FeatureVector::derive(
            Some(self.identity),
            self.features,
            self.features_text,
            self.metadata,
        )
    }
}
