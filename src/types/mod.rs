//! All data types for the metadata-cluster library.

pub mod error;
pub mod vector;

pub use error::{ClusterError, ClusterResult};
pub use vector::{FeatureVector, FeatureVectorBuilder, NON_COMPARABLE_FEATURES};

/// Lloyd iterations per run.
pub const DEFAULT_ITERATIONS: usize = 300;

/// Additional restarts after the first run (51 runs per k in total).
pub const DEFAULT_RESTARTS: usize = 50;

/// Smallest candidate k for the elbow search.
pub const DEFAULT_K_MIN: usize = 2;

/// Largest candidate k for the elbow search.
pub const DEFAULT_K_MAX: usize = 5;
