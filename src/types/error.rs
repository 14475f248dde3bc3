//! Error types for the metadata-cluster library.

use thiserror::Error;

/// All errors that can occur in the metadata-cluster library.
#[derive(Error, Debug)]
pub enum ClusterError {
    /// No points were supplied.
    #[error("Cannot cluster an empty point collection")]
    EmptyInput,

    /// Requested cluster count outside the accepted bounds.
    #[error("Cluster count {k} out of range [{min}, {max}]")]
    InvalidK { k: usize, min: usize, max: usize },

    /// Auto-k needs at least two candidate cluster counts to diff.
    #[error("Auto-k needs at least two candidate values of k, got {candidates}")]
    KRangeTooSmall { candidates: usize },

    /// Two points share an identity, which would alias distance cache entries.
    #[error("Duplicate point identity: {0}")]
    DuplicateIdentity(String),

    /// A point carries a NaN or infinite feature value.
    #[error("Point {identity} has non-finite value for feature {feature}")]
    NonFiniteFeature { identity: String, feature: String },

    /// The run was cancelled through its cancel token.
    #[error("Clustering cancelled")]
    Cancelled,

    /// The run exceeded its deadline.
    #[error("Clustering deadline exceeded")]
    DeadlineExceeded,

    /// A record lacks an attribute required by the extraction policy.
    #[error("Record {identity} is missing attribute {attribute}")]
    MissingAttribute { identity: String, attribute: String },

    /// A record attribute could not be interpreted by the extraction policy.
    #[error("Record {identity} has invalid value for {attribute}: {value}")]
    InvalidAttribute {
        identity: String,
        attribute: String,
        value: String,
    },

    /// Unrecognised distance metric name.
    #[error("Unknown distance metric: {0}")]
    UnknownMetric(String),

    /// Unrecognised extraction policy name.
    #[error("Unknown extraction policy: {0}")]
    UnknownPolicy(String),

    /// A record with the requested identity does not exist.
    #[error("Record not found: {0}")]
    RecordNotFound(String),

    /// Input file does not have a recognised record layout.
    #[error("Invalid record file: {0}")]
    InvalidRecordFile(String),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Convenience result type for metadata-cluster operations.
pub type ClusterResult<T> = Result<T, ClusterError>;
