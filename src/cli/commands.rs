//! CLI command implementations.

use std::path::{Path, PathBuf};

use crate::engine::{ClusterConfig, KSearch};
use crate::extract::{
    build_vectors, ExtractionPolicy, JsonRecordFile, MetadataDirectory, RecordSource,
    DEFAULT_IDENTITY_FIELD,
};
use crate::format::ClusterReport;
use crate::metric::DistanceMetric;
use crate::types::{ClusterError, ClusterResult, FeatureVector};

/// Where records come from and how they become vectors.
#[derive(Debug, Clone)]
pub struct LoadOptions {
    /// A JSON record file or a directory of `*.json` metadata files.
    pub input: PathBuf,
    /// Extraction policy.
    pub policy: ExtractionPolicy,
    /// MIME subtypes to keep. Empty = all.
    pub accept: Vec<String>,
    /// Identity attribute for record files.
    pub identity_field: String,
}

impl LoadOptions {
    /// Load `input` with the generic policy.
    pub fn new(input: impl Into<PathBuf>) -> Self {
        Self {
            input: input.into(),
            policy: ExtractionPolicy::Generic,
            accept: Vec::new(),
            identity_field: DEFAULT_IDENTITY_FIELD.to_string(),
        }
    }
}

/// Load records and build their feature vectors.
pub fn load_vectors(options: &LoadOptions) -> ClusterResult<Vec<FeatureVector>> {
    let records = if options.input.is_dir() {
        MetadataDirectory::new(&options.input)
            .with_accept(options.accept.clone())
            .load()?
    } else {
        JsonRecordFile::new(&options.input)
            .with_identity_field(options.identity_field.as_str())
            .with_accept(options.accept.clone())
            .load()?
    };
    let vectors = build_vectors(&records, &options.policy)?;
    log::info!(
        "Built {} {} vectors",
        vectors.len(),
        options.policy.name()
    );
    Ok(vectors)
}

/// Cluster the input and write the hierarchical report.
pub fn cmd_cluster(
    options: &LoadOptions,
    config: ClusterConfig,
    out: &Path,
    pretty: bool,
    json: bool,
) -> ClusterResult<()> {
    let vectors = load_vectors(options)?;
    let result = KSearch::new(&vectors, config)?.run()?;
    let report = ClusterReport::from_result(&result)?;
    report.write_to_file(out, pretty)?;

    if json {
        let sizes: Vec<_> = report
            .summary()
            .iter()
            .map(|(name, size)| serde_json::json!({"name": name, "size": size}))
            .collect();
        let info = serde_json::json!({
            "metric": result.metric.name(),
            "k": result.k,
            "distortion": result.distortion,
            "points": result.point_count(),
            "clusters": sizes,
            "report": out.display().to_string(),
        });
        println!("{}", serde_json::to_string_pretty(&info)?);
    } else {
        println!("Metric: {}", result.metric);
        println!("k: {}", result.k);
        println!("Distortion: {:.6}", result.distortion);
        for (name, size) in report.summary() {
            println!("  {}: {}", name, size);
        }
        println!("Wrote {}", out.display());
    }
    Ok(())
}

/// Print the best distortion per candidate k and the elbow choice.
pub fn cmd_sweep(options: &LoadOptions, config: ClusterConfig, json: bool) -> ClusterResult<()> {
    let vectors = load_vectors(options)?;
    let search = KSearch::new(&vectors, config)?;
    let sweep = search.sweep()?;

    if json {
        let candidates: Vec<_> = sweep
            .distortions()
            .iter()
            .map(|(k, d)| serde_json::json!({"k": k, "distortion": d}))
            .collect();
        let info = serde_json::json!({
            "metric": search.config().metric.name(),
            "candidates": candidates,
            "chosen_k": sweep.chosen_k(),
        });
        println!("{}", serde_json::to_string_pretty(&info)?);
    } else {
        for (k, distortion) in sweep.distortions() {
            println!("k = {}  distortion = {:.6}", k, distortion);
        }
        println!("Chosen k = {}", sweep.chosen_k());
    }
    Ok(())
}

/// Print the distance between two records.
pub fn cmd_distance(
    options: &LoadOptions,
    metric: DistanceMetric,
    identity_a: &str,
    identity_b: &str,
    json: bool,
) -> ClusterResult<()> {
    let vectors = load_vectors(options)?;
    let find = |identity: &str| {
        vectors
            .iter()
            .find(|v| v.identity() == Some(identity))
            .ok_or_else(|| ClusterError::RecordNotFound(identity.to_string()))
    };
    let a = find(identity_a)?;
    let b = find(identity_b)?;
    let distance = metric.distance(a, b);

    if json {
        println!(
            "{}",
            serde_json::json!({"a": identity_a, "b": identity_b, "metric": metric.name(), "distance": distance})
        );
    } else {
        println!("{} distance: {:.6}", metric, distance);
    }
    Ok(())
}

/// Write the default configuration as JSON.
pub fn cmd_init_config(path: &Path) -> ClusterResult<()> {
    ClusterConfig::default().save(path)?;
    println!("Created {}", path.display());
    Ok(())
}
