//! Cluster routing settings

use serde::{Deserialize, Serialize};

/// Execution cluster and the bucket its job artifacts are uploaded to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClusterProfile {
    pub cluster: String,
    pub bucket: String,
}

impl ClusterProfile {
    pub fn new(cluster: impl Into<String>, bucket: impl Into<String>) -> Self {
        Self {
            cluster: cluster.into(),
            bucket: bucket.into(),
        }
    }
}

/// Cluster/bucket pairs for each routing target
///
/// Periodic and postsubmit jobs share the postsubmit pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClusterSettings {
    pub presubmit: ClusterProfile,
    pub postsubmit: ClusterProfile,
}

impl Default for ClusterSettings {
    fn default() -> Self {
        Self {
            presubmit: ClusterProfile::new(
                "prow-presubmits-cluster",
                "s3://prow-data-presubmits-devstack-prowbucket7c73355c-5qn1vzrmqzuf",
            ),
            postsubmit: ClusterProfile::new(
                "prow-postsubmits-cluster",
                "s3://prow-data-devstack-prowbucket7c73355c-x1drvm9kvgac",
            ),
        }
    }
}
