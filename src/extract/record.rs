//! Record sources: raw per-item attribute maps loaded from disk.

use std::path::{Path, PathBuf};

use serde_json::{Map, Value};

use crate::types::{ClusterError, ClusterResult};

/// Attribute holding the item path in search-index documents.
pub const DEFAULT_IDENTITY_FIELD: &str = "metadata.filePath";

/// Attribute holding the MIME type of a record.
pub const CONTENT_TYPE_FIELD: &str = "Content-Type";

/// One item's raw attributes, keyed by a stable identity.
#[derive(Debug, Clone, PartialEq)]
pub struct RawRecord {
    /// Stable unique key (path or URI).
    pub identity: String,
    /// Attribute name -> raw JSON value.
    pub attributes: Map<String, Value>,
}

impl RawRecord {
    /// Create a record.
    pub fn new(identity: impl Into<String>, attributes: Map<String, Value>) -> Self {
        Self {
            identity: identity.into(),
            attributes,
        }
    }

    /// MIME subtype of the record (`pdf` for `application/pdf; charset=x`), lowercased.
    pub fn content_subtype(&self) -> Option<String> {
        let value = first_value(self.attributes.get(CONTENT_TYPE_FIELD)?)?;
        let mime = value.as_str()?;
        let essence = mime.split(';').next().unwrap_or(mime);
        let subtype = essence.rsplit('/').next().unwrap_or(essence);
        Some(subtype.trim().to_lowercase())
    }

    /// Whether the record passes an accept list of MIME subtypes. Empty accepts all.
    pub fn accepted_by(&self, accept: &[String]) -> bool {
        if accept.is_empty() {
            return true;
        }
        match self.content_subtype() {
            Some(subtype) => accept.iter().any(|a| a.eq_ignore_ascii_case(&subtype)),
            None => false,
        }
    }
}

/// Anything that produces raw records.
pub trait RecordSource {
    /// Load all records.
    fn load(&self) -> ClusterResult<Vec<RawRecord>>;
}

/// First element of a list value, or the value itself.
pub fn first_value(value: &Value) -> Option<&Value> {
    match value {
        Value::Array(items) => items.first(),
        other => Some(other),
    }
}

/// Stringify an attribute value: lists joined with `", "`, strings trimmed.
pub fn stringify(value: &Value) -> String {
    match value {
        Value::Array(items) => items
            .iter()
            .map(scalar_text)
            .collect::<Vec<_>>()
            .join(", ")
            .trim()
            .to_string(),
        other => scalar_text(other).trim().to_string(),
    }
}

fn scalar_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// A JSON file holding an array of records or a search-index select response.
pub struct JsonRecordFile {
    path: PathBuf,
    identity_field: String,
    accept: Vec<String>,
}

impl JsonRecordFile {
    /// Read records from `path`, identified by [`DEFAULT_IDENTITY_FIELD`].
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            identity_field: DEFAULT_IDENTITY_FIELD.to_string(),
            accept: Vec::new(),
        }
    }

    /// Use another attribute as the record identity.
    pub fn with_identity_field(mut self, field: impl Into<String>) -> Self {
        self.identity_field = field.into();
        self
    }

    /// Keep only records whose MIME subtype is listed.
    pub fn with_accept(mut self, accept: Vec<String>) -> Self {
        self.accept = accept;
        self
    }

    /// Parse records from an in-memory JSON value.
    pub fn parse(&self, value: Value) -> ClusterResult<Vec<RawRecord>> {
        let docs = match value {
            Value::Array(items) => items,
            Value::Object(mut root) => match root.remove("response") {
                Some(Value::Object(mut response)) => match response.remove("docs") {
                    Some(Value::Array(docs)) => docs,
                    _ => {
                        return Err(ClusterError::InvalidRecordFile(
                            "response has no docs array".to_string(),
                        ))
                    }
                },
                _ => {
                    return Err(ClusterError::InvalidRecordFile(
                        "expected an array of records or a response object".to_string(),
                    ))
                }
            },
            _ => {
                return Err(ClusterError::InvalidRecordFile(
                    "expected an array of records or a response object".to_string(),
                ))
            }
        };

        let mut records = Vec::with_capacity(docs.len());
        for (index, doc) in docs.into_iter().enumerate() {
            let Value::Object(attributes) = doc else {
                return Err(ClusterError::InvalidRecordFile(format!(
                    "record {} is not an object",
                    index
                )));
            };
            let identity = self
                .identity_of(&attributes)
                .unwrap_or_else(|| format!("record-{}", index));
            let record = RawRecord::new(identity, attributes);
            if record.accepted_by(&self.accept) {
                records.push(record);
            }
        }
        Ok(records)
    }

    fn identity_of(&self, attributes: &Map<String, Value>) -> Option<String> {
        [self.identity_field.as_str(), "id"]
            .iter()
            .filter_map(|field| attributes.get(*field))
            .filter_map(first_value)
            .map(stringify)
            .find(|s| !s.is_empty())
    }
}

impl RecordSource for JsonRecordFile {
    fn load(&self) -> ClusterResult<Vec<RawRecord>> {
        let data = std::fs::read_to_string(&self.path)?;
        let value: Value = serde_json::from_str(&data)?;
        let records = self.parse(value)?;
        log::info!(
            "Loaded {} records from {}",
            records.len(),
            self.path.display()
        );
        Ok(records)
    }
}

/// A directory tree of `*.json` metadata files, one record per file.
pub struct MetadataDirectory {
    root: PathBuf,
    accept: Vec<String>,
}

impl MetadataDirectory {
    /// Walk `root` recursively.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            accept: Vec::new(),
        }
    }

    /// Keep only records whose MIME subtype is listed.
    pub fn with_accept(mut self, accept: Vec<String>) -> Self {
        self.accept = accept;
        self
    }

    fn collect_files(dir: &Path, out: &mut Vec<PathBuf>) -> ClusterResult<()> {
        for entry in std::fs::read_dir(dir)? {
            let entry = entry?;
            let path = entry.path();
            let hidden = entry.file_name().to_string_lossy().starts_with('.');
            if hidden {
                continue;
            }
            if entry.file_type()?.is_dir() {
                Self::collect_files(&path, out)?;
            } else if path.extension().is_some_and(|ext| ext == "json") {
                out.push(path);
            }
        }
        Ok(())
    }
}

impl RecordSource for MetadataDirectory {
    fn load(&self) -> ClusterResult<Vec<RawRecord>> {
        let mut files = Vec::new();
        Self::collect_files(&self.root, &mut files)?;
        files.sort();

        let mut records = Vec::with_capacity(files.len());
        for path in files {
            let data = std::fs::read_to_string(&path)?;
            let attributes = match serde_json::from_str::<Value>(&data) {
                Ok(Value::Object(map)) => map,
                Err(e) => {
                    log::warn!("Skipping {}: {}", path.display(), e);
                    continue;
                }
                Ok(_) => {
                    log::warn!("Skipping {}: not a JSON object", path.display());
                    continue;
                }
            };
            if attributes.is_empty() {
                log::warn!("Skipping {}: no metadata", path.display());
                continue;
            }
            let record = RawRecord::new(path.display().to_string(), attributes);
            if record.accepted_by(&self.accept) {
                records.push(record);
            }
        }
        if self.accept.is_empty() {
            log::info!("Accepting all MIME types");
        }
        log::info!(
            "Loaded {} records from {}",
            records.len(),
            self.root.display()
        );
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_stringify_lists_and_scalars() {
        assert_eq!(stringify(&json!("  padded ")), "padded");
        assert_eq!(stringify(&json!(["a", 1, true])), "a, 1, true");
        assert_eq!(stringify(&json!(42)), "42");
        assert_eq!(stringify(&json!(null)), "");
    }

    #[test]
    fn test_content_subtype_strips_parameters() {
        let mut attributes = Map::new();
        attributes.insert(
            CONTENT_TYPE_FIELD.to_string(),
            json!(["text/HTML; charset=UTF-8"]),
        );
        let record = RawRecord::new("a", attributes);
        assert_eq!(record.content_subtype().as_deref(), Some("html"));
        assert!(record.accepted_by(&["html".to_string()]));
        assert!(!record.accepted_by(&["pdf".to_string()]));
        assert!(record.accepted_by(&[]));
    }
}
