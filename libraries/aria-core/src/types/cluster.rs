//! Cluster types
//!
//! A `ClusterType` names a tag dimension ("GENRE", "MOOD"); a `Cluster` is a
//! value within that dimension ("Rock"). Membership counts are a cache, the
//! `track_cluster` table is the source of truth.

use serde::{Deserialize, Serialize};

pub type ClusterTypeId = i64;
pub type ClusterId = i64;

/// A tag dimension
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClusterType {
    pub id: ClusterTypeId,
    pub name: String,
}

/// A tag value within a dimension
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cluster {
    pub id: ClusterId,
    pub cluster_type_id: ClusterTypeId,
    pub name: String,
    pub track_count: i64,
    pub release_count: i64,
}
