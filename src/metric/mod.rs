//! Distance metrics between feature vectors.

pub mod distance;
pub mod edit;

pub use distance::{
    cosine_distance, cosine_similarity, dot_product, edit_distance, euclidean_distance,
    jaccard_distance, DistanceMetric,
};
pub use edit::{levenshtein, normalized_edit_distance};
