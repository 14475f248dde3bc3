//! metadata-cluster: metric-agnostic clustering of sparse metadata feature vectors.
//!
//! Items (documents, geospatial records, sensor readings) become sparse feature
//! vectors. A generalized Lloyd's algorithm clusters them under a pluggable
//! metric (Euclidean, cosine, edit, Jaccard), using arithmetic-mean centroids
//! for Euclidean and medoid clustroids otherwise. Each k keeps the best of many
//! restarts, and an elbow heuristic picks k when it is not given.

pub mod cli;
pub mod engine;
pub mod extract;
pub mod format;
pub mod metric;
pub mod types;

// Re-export commonly used types at the crate root
pub use engine::{
    cluster, elbow, CancelToken, ClusterConfig, ClusteringContext, ClusteringResult,
    DistanceCache, KSearch, KSweep, LloydParams, LloydRun, MeanDenominator, Representative,
};
pub use extract::{ExtractionPolicy, JsonRecordFile, MetadataDirectory, RawRecord, RecordSource};
pub use format::ClusterReport;
pub use metric::DistanceMetric;
pub use types::{
    ClusterError, ClusterResult, FeatureVector, FeatureVectorBuilder, DEFAULT_ITERATIONS,
    DEFAULT_K_MAX, DEFAULT_K_MIN, DEFAULT_RESTARTS, NON_COMPARABLE_FEATURES,
};
