//! Job domain types

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Kind of Prow job
///
/// Determines trigger semantics, the template used to render the job and
/// the default service account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobKind {
    Periodic,
    Postsubmit,
    Presubmit,
}

impl JobKind {
    /// All job kinds, in generation order
    pub const ALL: [JobKind; 3] = [JobKind::Periodic, JobKind::Postsubmit, JobKind::Presubmit];

    /// Lowercase name (e.g. `presubmit`)
    pub fn as_str(&self) -> &'static str {
        match self {
            JobKind::Periodic => "periodic",
            JobKind::Postsubmit => "postsubmit",
            JobKind::Presubmit => "presubmit",
        }
    }

    /// Plural name (e.g. `presubmits`), used for file suffixes and service accounts
    pub fn plural(&self) -> &'static str {
        match self {
            JobKind::Periodic => "periodics",
            JobKind::Postsubmit => "postsubmits",
            JobKind::Presubmit => "presubmits",
        }
    }
}

impl fmt::Display for JobKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unsupported job kind
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unsupported job type: {0}")]
pub struct UnknownJobKind(pub String);

impl FromStr for JobKind {
    type Err = UnknownJobKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "periodic" => Ok(JobKind::Periodic),
            "postsubmit" => Ok(JobKind::Postsubmit),
            "presubmit" => Ok(JobKind::Presubmit),
            other => Err(UnknownJobKind(other.to_string())),
        }
    }
}

/// Declarative definition of a single Prow job
///
/// Deserialized from the YAML job definition files. Every field is optional
/// in the source; absent fields take their `Default` value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default, deny_unknown_fields)]
pub struct JobDefinition {
    pub job_name: String,
    pub architecture: Option<String>,
    pub run_if_changed: Option<String>,
    pub skip_if_only_changed: Option<String>,
    pub branches: Vec<String>,
    pub cron_expression: Option<String>,
    pub max_concurrency: Option<u32>,
    pub timeout: Option<String>,
    pub extra_refs: Vec<ExtraRef>,
    pub image_build: bool,
    pub use_docker_build_x: bool,
    pub use_minimal_builder_base: bool,
    pub pr_creation: bool,
    pub local_registry: bool,
    pub runtime_image: Option<String>,
    pub project_path: Option<String>,
    pub commands: Vec<String>,
    pub resources: Option<Resources>,
    pub env_vars: Vec<EnvVar>,
    pub volumes: Vec<Volume>,
    pub volume_mounts: Vec<VolumeMount>,
    pub cluster: Option<String>,
    pub service_account_name: Option<String>,
    pub automount_service_account_token: Option<String>,
    pub run_as_user: Option<String>,
    pub run_as_group: Option<String>,
}

/// Environment variable passed to the build container
///
/// Order within a job is preserved in the rendered output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvVar {
    pub name: String,
    pub value: String,
}

impl EnvVar {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// Resource requests and limits for the build container
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Resources {
    pub requests: Option<ResourceQuantities>,
    pub limits: Option<ResourceQuantities>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ResourceQuantities {
    pub cpu: Option<String>,
    pub memory: Option<String>,
}

/// Additional repository checked out next to the job's own repository
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ExtraRef {
    pub org: String,
    pub repo: String,
    pub base_ref: String,
}

/// Pod volume
///
/// Exactly one source must be set in the definition file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Volume {
    pub name: String,
    #[serde(flatten)]
    pub source: VolumeSource,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum VolumeSource {
    HostPath(HostPathVolume),
    Secret(SecretVolume),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HostPathVolume {
    pub path: String,
    #[serde(rename = "type", default)]
    pub path_type: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct SecretVolume {
    pub secret_name: String,
    #[serde(default)]
    pub default_mode: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct VolumeMount {
    pub name: String,
    pub mount_path: String,
    #[serde(default)]
    pub read_only: bool,
}

/// Jobs of one kind, keyed by repository name (`<org>/<repo>`) and then by
/// output file name
pub type JobSet = BTreeMap<String, BTreeMap<String, JobDefinition>>;
