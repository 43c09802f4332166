//! Defaulting rules
//!
//! Pure functions that derive the environment-specific parts of a job
//! (cluster, bucket, service account, branches, builder tag, extra
//! environment variables) from its kind and explicit overrides.
//! None of them can fail.

use crate::domain::cluster::{ClusterProfile, ClusterSettings};
use crate::domain::job::{EnvVar, JobKind};

/// Branch pattern used by postsubmits that do not list any branches
pub const DEFAULT_POSTSUBMIT_BRANCH: &str = "^main$";

/// Separator placed between a job's commands
pub const COMMAND_SEPARATOR: &str = "\n&&\n";

/// Cluster, bucket and service account resolved for one job
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClusterDetails {
    pub cluster: String,
    pub bucket: String,
    pub service_account: String,
}

/// Whether an explicit cluster override routes the job as a postsubmit
///
/// Pinning a job to the postsubmit cluster also moves it to the postsubmit
/// bucket and service account, whatever its kind.
pub fn routes_as_postsubmit(explicit_cluster: Option<&str>, settings: &ClusterSettings) -> bool {
    explicit_cluster == Some(settings.postsubmit.cluster.as_str())
}

/// Resolve cluster, bucket and service account for a job
///
/// # Arguments
/// * `kind` - The job kind
/// * `explicit_cluster` - Cluster override from the job definition
/// * `explicit_service_account` - Service account override; empty counts as unset
/// * `settings` - Cluster/bucket pairs to pick from
pub fn cluster_details(
    kind: JobKind,
    explicit_cluster: Option<&str>,
    explicit_service_account: Option<&str>,
    settings: &ClusterSettings,
) -> ClusterDetails {
    let kind = if routes_as_postsubmit(explicit_cluster, settings) {
        JobKind::Postsubmit
    } else {
        kind
    };

    let ClusterProfile { cluster, bucket } = match kind {
        JobKind::Periodic | JobKind::Postsubmit => settings.postsubmit.clone(),
        JobKind::Presubmit => settings.presubmit.clone(),
    };

    let service_account = match explicit_service_account {
        Some(account) if !account.is_empty() => account.to_string(),
        _ => format!("{}-build-account", kind.plural()),
    };

    ClusterDetails {
        cluster,
        bucket,
        service_account,
    }
}

/// Branch patterns a job runs on
///
/// Postsubmits without explicit branches run on `main` only. Every other
/// list is returned unchanged.
pub fn branches(kind: JobKind, explicit: &[String]) -> Vec<String> {
    if kind == JobKind::Postsubmit && explicit.is_empty() {
        return vec![DEFAULT_POSTSUBMIT_BRANCH.to_string()];
    }
    explicit.to_vec()
}

/// Builder base image tag for a job
///
/// Jobs that ask for the minimal builder base get the first `standard`
/// in the tag swapped for `minimal`.
pub fn builder_base_tag(base_tag: &str, use_minimal: bool) -> String {
    if use_minimal {
        base_tag.replacen("standard", "minimal", 1)
    } else {
        base_tag.to_string()
    }
}

/// Environment variables for a job's build container
///
/// Jobs using docker buildx get the buildkitd image and the buildx switch
/// appended after their own variables.
pub fn env_vars(explicit: &[EnvVar], use_docker_buildx: bool, buildkit_image_tag: &str) -> Vec<EnvVar> {
    let mut vars = explicit.to_vec();
    if use_docker_buildx {
        vars.push(EnvVar::new(
            "BUILDKITD_IMAGE",
            format!("moby/buildkit:{}", buildkit_image_tag),
        ));
        vars.push(EnvVar::new("USE_BUILDX", "true"));
    }
    vars
}

/// Join a job's commands into a single shell command
pub fn command(commands: &[String]) -> String {
    commands.join(COMMAND_SEPARATOR)
}
