//! Render context
//!
//! The typed set of fields a template can reference. Built fresh for each
//! job by merging its definition with the defaulting rules, and discarded
//! once the job is written.

use prowgen_core::defaults;
use prowgen_core::domain::job::{
    ExtraRef, HostPathVolume, Resources, SecretVolume, Volume, VolumeMount, VolumeSource,
};
use prowgen_core::{ClusterSettings, EnvVar, JobDefinition, JobKind};
use serde::Serialize;

use crate::templates;

/// Environment-wide values merged into every job
#[derive(Debug, Clone)]
pub struct ContextDefaults {
    pub clusters: ClusterSettings,
    pub builder_base_tag: String,
    pub buildkit_image_tag: String,
    pub edit_warning: String,
}

impl Default for ContextDefaults {
    fn default() -> Self {
        Self {
            clusters: ClusterSettings::default(),
            builder_base_tag: templates::builder_base_tag().to_string(),
            buildkit_image_tag: templates::BUILDKIT_IMAGE_TAG.to_string(),
            edit_warning: templates::edit_warning().to_string(),
        }
    }
}

/// Fields available to a job template
///
/// Field names are the camelCase names used in the templates.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderContext {
    pub edit_warning: String,
    pub repo_name: String,
    pub prowjob_name: String,
    pub architecture: Option<String>,
    pub max_concurrency: Option<u32>,
    pub timeout: Option<String>,
    pub image_build: bool,
    pub use_docker_build_x: bool,
    pub pr_creation: bool,
    pub local_registry: bool,
    pub runtime_image: Option<String>,
    pub project_path: Option<String>,
    pub command: String,
    pub builder_base_tag: String,
    pub buildkit_image_tag: String,
    pub resources: Option<Resources>,
    pub env_vars: Vec<EnvVar>,
    pub volumes: Vec<VolumeContext>,
    pub volume_mounts: Vec<VolumeMount>,
    pub service_account_name: String,
    pub automount_service_account_token: Option<String>,
    pub cluster: String,
    pub bucket: String,
    pub disk_usage: bool,
    pub run_as_user: Option<String>,
    pub run_as_group: Option<String>,
    #[serde(flatten)]
    pub trigger: Trigger,
}

/// Kind-specific trigger fields
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Trigger {
    Presubmit(PresubmitTrigger),
    Postsubmit(PostsubmitTrigger),
    Periodic(PeriodicTrigger),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PresubmitTrigger {
    pub run_if_changed: Option<String>,
    pub skip_if_only_changed: Option<String>,
    pub branches: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostsubmitTrigger {
    pub run_if_changed: Option<String>,
    pub branches: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PeriodicTrigger {
    pub cron_expression: String,
    pub extra_refs: Vec<ExtraRef>,
}

/// Volume with both possible sources spelled out
///
/// Templates can test `volume.hostPath` and `volume.secret` without
/// tripping strict undefined checks.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VolumeContext {
    pub name: String,
    pub host_path: Option<HostPathVolume>,
    pub secret: Option<SecretVolume>,
}

impl From<&Volume> for VolumeContext {
    fn from(volume: &Volume) -> Self {
        let (host_path, secret) = match &volume.source {
            VolumeSource::HostPath(host_path) => (Some(host_path.clone()), None),
            VolumeSource::Secret(secret) => (None, Some(secret.clone())),
        };
        Self {
            name: volume.name.clone(),
            host_path,
            secret,
        }
    }
}

impl Trigger {
    fn for_job(kind: JobKind, job: &JobDefinition) -> Self {
        let branches = defaults::branches(kind, &job.branches);
        match kind {
            JobKind::Presubmit => Trigger::Presubmit(PresubmitTrigger {
                run_if_changed: job.run_if_changed.clone(),
                skip_if_only_changed: job.skip_if_only_changed.clone(),
                branches,
            }),
            JobKind::Postsubmit => Trigger::Postsubmit(PostsubmitTrigger {
                run_if_changed: job.run_if_changed.clone(),
                branches,
            }),
            JobKind::Periodic => Trigger::Periodic(PeriodicTrigger {
                cron_expression: job.cron_expression.clone().unwrap_or_default(),
                extra_refs: job.extra_refs.clone(),
            }),
        }
    }
}

impl RenderContext {
    /// Build the context for one job
    ///
    /// # Arguments
    /// * `kind` - The job kind
    /// * `repo_name` - Repository the job belongs to (`<org>/<repo>`)
    /// * `job` - The job definition
    /// * `env` - Environment-wide defaults
    pub fn build(
        kind: JobKind,
        repo_name: &str,
        job: &JobDefinition,
        env: &ContextDefaults,
    ) -> Self {
        let details = defaults::cluster_details(
            kind,
            job.cluster.as_deref(),
            job.service_account_name.as_deref(),
            &env.clusters,
        );

        Self {
            edit_warning: env.edit_warning.clone(),
            repo_name: repo_name.to_string(),
            prowjob_name: job.job_name.clone(),
            architecture: job.architecture.clone(),
            max_concurrency: job.max_concurrency,
            timeout: job.timeout.clone(),
            image_build: job.image_build,
            use_docker_build_x: job.use_docker_build_x,
            pr_creation: job.pr_creation,
            local_registry: job.local_registry,
            runtime_image: job.runtime_image.clone(),
            project_path: job.project_path.clone(),
            command: defaults::command(&job.commands),
            builder_base_tag: defaults::builder_base_tag(
                &env.builder_base_tag,
                job.use_minimal_builder_base,
            ),
            buildkit_image_tag: env.buildkit_image_tag.clone(),
            resources: job.resources.clone(),
            env_vars: defaults::env_vars(
                &job.env_vars,
                job.use_docker_build_x,
                &env.buildkit_image_tag,
            ),
            volumes: job.volumes.iter().map(VolumeContext::from).collect(),
            volume_mounts: job.volume_mounts.clone(),
            service_account_name: details.service_account,
            automount_service_account_token: job.automount_service_account_token.clone(),
            cluster: details.cluster,
            bucket: details.bucket,
            disk_usage: true,
            run_as_user: job.run_as_user.clone(),
            run_as_group: job.run_as_group.clone(),
            trigger: Trigger::for_job(kind, job),
        }
    }

    /// Branches the job triggers on, if its kind has any
    pub fn branches(&self) -> &[String] {
        match &self.trigger {
            Trigger::Presubmit(t) => &t.branches,
            Trigger::Postsubmit(t) => &t.branches,
            Trigger::Periodic(_) => &[],
        }
    }
}
