//! The clustering engine: assignment, recentering, Lloyd runs and k search.

pub mod assign;
pub mod cache;
pub mod centroid;
pub mod config;
pub mod context;
pub mod lloyd;
pub mod result;
pub mod search;

pub use assign::{assign, reseed_empty, Assignment, Cluster};
pub use cache::DistanceCache;
pub use centroid::{clustroid, mean_centroid, recenter, Representative};
pub use config::{ClusterConfig, MeanDenominator};
pub use context::{CancelToken, ClusteringContext};
pub use lloyd::{LloydParams, LloydRun};
pub use result::ClusteringResult;
pub use search::{cluster, elbow, KSearch, KSweep};
