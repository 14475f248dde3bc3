//! Record acquisition and feature-vector extraction.

pub mod policy;
pub mod record;

pub use policy::{build_vectors, ExtractionPolicy};
pub use record::{
    first_value, stringify, JsonRecordFile, MetadataDirectory, RawRecord, RecordSource,
    CONTENT_TYPE_FIELD, DEFAULT_IDENTITY_FIELD,
};
