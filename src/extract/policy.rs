//! Vector builder: extraction policies turning raw records into feature vectors.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::record::{first_value, stringify, RawRecord};
use crate::metric::DistanceMetric;
use crate::types::{
    ClusterError, ClusterResult, FeatureVector, FeatureVectorBuilder, NON_COMPARABLE_FEATURES,
};

/// Default latitude attribute for [`ExtractionPolicy::Geo`].
pub const GEO_LATITUDE_FIELD: &str = "metadata.Geographic_LATITUDE";
/// Default longitude attribute for [`ExtractionPolicy::Geo`].
pub const GEO_LONGITUDE_FIELD: &str = "metadata.Geographic_LONGITUDE";
/// Default concept attribute for [`ExtractionPolicy::Concept`].
pub const CONCEPT_FIELD: &str = "metadata.sweet_concept";
/// Default measurement value attribute for [`ExtractionPolicy::Measurement`].
pub const MEASUREMENT_VALUE_FIELD: &str = "metadata.measurement_value";
/// Default measurement unit attribute for [`ExtractionPolicy::Measurement`].
pub const MEASUREMENT_UNIT_FIELD: &str = "metadata.measurement_unit";

/// Which raw attributes populate a vector's features.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ExtractionPolicy {
    /// Every attribute; magnitude is the length of its stringified value.
    #[default]
    Generic,
    /// Two numeric coordinates.
    Geo { latitude: String, longitude: String },
    /// One indicator feature per value of a multi-valued attribute.
    Concept { field: String },
    /// Per-unit average of measurement values.
    Measurement { values: String, units: String },
}

impl ExtractionPolicy {
    /// Geographic policy over the default coordinate attributes.
    pub fn geo() -> Self {
        Self::Geo {
            latitude: GEO_LATITUDE_FIELD.to_string(),
            longitude: GEO_LONGITUDE_FIELD.to_string(),
        }
    }

    /// Concept-set policy over the default concept attribute.
    pub fn concept() -> Self {
        Self::Concept {
            field: CONCEPT_FIELD.to_string(),
        }
    }

    /// Measurement policy over the default value/unit attributes.
    pub fn measurement() -> Self {
        Self::Measurement {
            values: MEASUREMENT_VALUE_FIELD.to_string(),
            units: MEASUREMENT_UNIT_FIELD.to_string(),
        }
    }

    /// Parse a policy name with default attribute names.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_lowercase().as_str() {
            "generic" | "grobid" => Some(Self::Generic),
            "geo" => Some(Self::geo()),
            "concept" | "sweet" => Some(Self::concept()),
            "measurement" => Some(Self::measurement()),
            _ => None,
        }
    }

    /// Return a human-readable name for this policy.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Generic => "generic",
            Self::Geo { .. } => "geo",
            Self::Concept { .. } => "concept",
            Self::Measurement { .. } => "measurement",
        }
    }

    /// The metric this kind of vector is usually clustered with.
    pub fn preferred_metric(&self) -> DistanceMetric {
        match self {
            Self::Generic => DistanceMetric::Edit,
            Self::Geo { .. } => DistanceMetric::Euclidean,
            Self::Concept { .. } => DistanceMetric::Jaccard,
            Self::Measurement { .. } => DistanceMetric::Cosine,
        }
    }

    /// Build the feature vector for one record.
    pub fn build(&self, record: &RawRecord) -> ClusterResult<FeatureVector> {
        let builder = FeatureVectorBuilder::new(record.identity.as_str());
        let builder = match self {
            Self::Generic => record
                .attributes
                .iter()
                .filter(|(name, _)| !NON_COMPARABLE_FEATURES.contains(&name.as_str()))
                .fold(builder, |b, (name, value)| {
                    let text = stringify(value);
                    b.text_feature(name.as_str(), text.chars().count() as f64, text)
                }),
            Self::Geo {
                latitude,
                longitude,
            } => {
                let lat = numeric_attribute(record, latitude)?;
                let lon = numeric_attribute(record, longitude)?;
                builder
                    .feature(latitude.as_str(), lat)
                    .feature(longitude.as_str(), lon)
            }
            Self::Concept { field } => list_attribute(record, field)?
                .into_iter()
                .map(stringify)
                .filter(|concept| !concept.is_empty())
                .fold(builder, |b, concept| b.feature(concept, 1.0)),
            Self::Measurement { values, units } => {
                let values_list = list_attribute(record, values)?;
                let units_list = list_attribute(record, units)?;
                if values_list.len() != units_list.len() {
                    return Err(ClusterError::InvalidAttribute {
                        identity: record.identity.clone(),
                        attribute: values.clone(),
                        value: format!(
                            "{} values for {} units",
                            values_list.len(),
                            units_list.len()
                        ),
                    });
                }
                let mut by_unit: BTreeMap<String, (f64, usize)> = BTreeMap::new();
                for (value, unit) in values_list.iter().zip(units_list.iter()) {
                    let number = parse_number(value).ok_or_else(|| invalid(record, values, value))?;
                    let entry = by_unit.entry(stringify(unit)).or_insert((0.0, 0));
                    entry.0 += number;
                    entry.1 += 1;
                }
                by_unit
                    .into_iter()
                    .fold(builder, |b, (unit, (sum, count))| {
                        b.feature(unit, sum / count as f64)
                    })
            }
        };
        Ok(builder.metadata(record.attributes.clone()).build())
    }
}

/// Build vectors for every record with one policy.
pub fn build_vectors(
    records: &[RawRecord],
    policy: &ExtractionPolicy,
) -> ClusterResult<Vec<FeatureVector>> {
    records.iter().map(|record| policy.build(record)).collect()
}

fn attribute<'a>(record: &'a RawRecord, name: &str) -> ClusterResult<&'a Value> {
    record
        .attributes
        .get(name)
        .ok_or_else(|| ClusterError::MissingAttribute {
            identity: record.identity.clone(),
            attribute: name.to_string(),
        })
}

fn list_attribute<'a>(record: &'a RawRecord, name: &str) -> ClusterResult<Vec<&'a Value>> {
    Ok(match attribute(record, name)? {
        Value::Array(items) => items.iter().collect(),
        other => vec![other],
    })
}

fn numeric_attribute(record: &RawRecord, name: &str) -> ClusterResult<f64> {
    let value = attribute(record, name)?;
    first_value(value)
        .and_then(parse_number)
        .ok_or_else(|| invalid(record, name, value))
}

fn parse_number(value: &Value) -> Option<f64> {
    let number = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }?;
    // Features must be finite; "NaN" and "inf" still parse as f64.
    number.is_finite().then_some(number)
}

fn invalid(record: &RawRecord, name: &str, value: &Value) -> ClusterError {
    ClusterError::InvalidAttribute {
        identity: record.identity.clone(),
        attribute: name.to_string(),
        value: value.to_string(),
    }
}
