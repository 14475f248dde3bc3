//! Hierarchical JSON cluster report (`clusters -> clusterN -> members`).

use std::path::Path;

use serde::Serialize;

use crate::engine::ClusteringResult;
use crate::types::ClusterResult;

/// One clustered item.
#[derive(Debug, Clone, Serialize)]
pub struct MemberNode {
    /// Last path segment of the identity.
    pub name: String,
    /// Full identity.
    pub path: String,
    /// Raw attributes, as a JSON-encoded string.
    pub metadata: String,
}

/// One cluster and its members.
#[derive(Debug, Clone, Serialize)]
pub struct ClusterNode {
    /// `cluster<index>`.
    pub name: String,
    /// Member items.
    pub children: Vec<MemberNode>,
}

/// Root of the report.
#[derive(Debug, Clone, Serialize)]
pub struct ClusterReport {
    /// Always `clusters`.
    pub name: String,
    /// One node per cluster.
    pub children: Vec<ClusterNode>,
}

impl ClusterReport {
    /// Build the report from a clustering result.
    pub fn from_result(result: &ClusteringResult) -> ClusterResult<Self> {
        let mut children = Vec::with_capacity(result.clusters.len());
        for (index, members) in &result.clusters {
            let mut nodes = Vec::with_capacity(members.len());
            for member in members {
                let path = member.identity().unwrap_or_default().to_string();
                let metadata = match member.metadata() {
                    Some(map) => serde_json::to_string(map)?,
                    None => serde_json::to_string(member.features())?,
                };
                nodes.push(MemberNode {
                    name: base_name(&path).to_string(),
                    path,
                    metadata,
                });
            }
            children.push(ClusterNode {
                name: format!("cluster{}", index),
                children: nodes,
            });
        }
        Ok(Self {
            name: "clusters".to_string(),
            children,
        })
    }

    /// Serialize to a JSON string.
    pub fn to_json(&self, pretty: bool) -> ClusterResult<String> {
        Ok(if pretty {
            serde_json::to_string_pretty(self)?
        } else {
            serde_json::to_string(self)?
        })
    }

    /// Write the report to a file.
    pub fn write_to_file(&self, path: &Path, pretty: bool) -> ClusterResult<()> {
        std::fs::write(path, self.to_json(pretty)?)?;
        Ok(())
    }

    /// `(cluster name, member count)` for every cluster.
    pub fn summary(&self) -> Vec<(&str, usize)> {
        self.children
            .iter()
            .map(|c| (c.name.as_str(), c.children.len()))
            .collect()
    }
}

fn base_name(path: &str) -> &str {
    path.rsplit(|c: char| c == '/' || c == '\\').next().unwrap_or(path)
}
