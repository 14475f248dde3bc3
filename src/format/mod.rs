//! Output formats for clustering results.

pub mod report;

pub use report::{ClusterNode, ClusterReport, MemberNode};
