//! Generation pipeline
//!
//! Drives job source → defaulting → rendering → writing for every
//! configured job kind. The run is sequential and stops at the first error.

use prowgen_core::{ClusterSettings, JobDefinition, JobKind, JobSet};
use std::collections::btree_map::Entry;
use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;
use tracing::{debug, info, warn};

use crate::context::{ContextDefaults, RenderContext};
use crate::error::{GenerateError, LoadError, Result};
use crate::renderer::TemplateRenderer;
use crate::source::JobSource;
use crate::templates;
use crate::writer::JobWriter;

/// Settings for a generation run
///
/// Everything the generator needs is passed in here; nothing is read from
/// process-wide state.
#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    /// Directory generated jobs are written under
    pub jobs_root: PathBuf,
    /// Top-level output namespaces cleaned before writing
    pub organizations: Vec<String>,
    /// Job kinds to generate, by name, in order
    pub job_kinds: Vec<String>,
    pub clusters: ClusterSettings,
    pub builder_base_tag: String,
    pub buildkit_image_tag: String,
}

impl GeneratorConfig {
    /// Creates a configuration with the built-in defaults
    pub fn new(jobs_root: impl Into<PathBuf>) -> Self {
        Self {
            jobs_root: jobs_root.into(),
            organizations: vec!["rcrozean".to_string()],
            job_kinds: JobKind::ALL.iter().map(|k| k.to_string()).collect(),
            clusters: ClusterSettings::default(),
            builder_base_tag: templates::builder_base_tag().to_string(),
            buildkit_image_tag: templates::BUILDKIT_IMAGE_TAG.to_string(),
        }
    }

    pub fn with_organizations(mut self, organizations: Vec<String>) -> Self {
        self.organizations = organizations;
        self
    }

    pub fn with_job_kinds(mut self, job_kinds: Vec<String>) -> Self {
        self.job_kinds = job_kinds;
        self
    }
}

/// Outcome of a successful `generate`
#[derive(Debug, Clone, Default)]
pub struct GenerationReport {
    /// Every file written, in write order
    pub written: Vec<PathBuf>,
    /// Number of jobs written per kind
    pub per_kind: BTreeMap<JobKind, usize>,
}

/// Differences between generated output and what is on disk
///
/// All paths are relative to the jobs root.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CheckReport {
    /// Jobs that would be generated but have no file
    pub missing: Vec<PathBuf>,
    /// Files whose contents differ from what would be generated
    pub outdated: Vec<PathBuf>,
    /// Files under a configured organization that no job produces
    pub stale: Vec<PathBuf>,
}

impl CheckReport {
    pub fn is_clean(&self) -> bool {
        self.missing.is_empty() && self.outdated.is_empty() && self.stale.is_empty()
    }
}

/// Prow job generator
pub struct Generator<S: JobSource> {
    config: GeneratorConfig,
    source: S,
    renderer: TemplateRenderer,
    writer: JobWriter,
    defaults: ContextDefaults,
}

impl<S: JobSource> Generator<S> {
    pub fn new(config: GeneratorConfig, source: S) -> Self {
        let defaults = ContextDefaults {
            clusters: config.clusters.clone(),
            builder_base_tag: config.builder_base_tag.clone(),
            buildkit_image_tag: config.buildkit_image_tag.clone(),
            edit_warning: templates::edit_warning().to_string(),
        };
        let writer = JobWriter::new(config.jobs_root.clone());

        Self {
            config,
            source,
            renderer: TemplateRenderer::new(),
            writer,
            defaults,
        }
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Regenerate every job
    ///
    /// Previous output for each configured organization is removed first.
    pub fn generate(&self) -> Result<GenerationReport> {
        info!(
            "Generating {} jobs into {}",
            self.config.job_kinds.join(", "),
            self.config.jobs_root.display()
        );

        let loaded = self.load_all()?;

        self.writer
            .clean(&self.config.organizations)
            .map_err(GenerateError::Clean)?;

        let mut report = GenerationReport::default();
        for (kind, jobs) in &loaded {
            let kind = *kind;
            let mut count = 0;

            for (repo, file, job) in flatten(&jobs) {
                let contents = self.render_job(kind, repo, file, job)?;
                let path = self
                    .writer
                    .write(repo, file, &contents)
                    .map_err(|source| GenerateError::Write {
                        kind,
                        repo: repo.to_string(),
                        file: file.to_string(),
                        source,
                    })?;

                debug!("Wrote {}", path.display());
                report.written.push(path);
                count += 1;
            }

            info!("Generated {} {} job(s)", count, kind);
            *report.per_kind.entry(kind).or_default() += count;
        }

        Ok(report)
    }

    /// Compare what would be generated with what is on disk
    ///
    /// Nothing is written.
    pub fn check(&self) -> Result<CheckReport> {
        let mut report = CheckReport::default();
        let mut expected = BTreeSet::new();

        for (kind, jobs) in self.load_all()? {
            for (repo, file, job) in flatten(&jobs) {
                let contents = self.render_job(kind, repo, file, job)?;
                let relative = PathBuf::from(repo).join(file);

                match self
                    .writer
                    .read_existing(repo, file)
                    .map_err(GenerateError::Read)?
                {
                    None => report.missing.push(relative.clone()),
                    Some(existing) if existing != contents => {
                        report.outdated.push(relative.clone())
                    }
                    Some(_) => {}
                }
                expected.insert(relative);
            }
        }

        let existing = self
            .writer
            .existing_files(&self.config.organizations)
            .map_err(GenerateError::Read)?;
        report.stale = existing.difference(&expected).cloned().collect();

        Ok(report)
    }

    /// Load every configured job kind
    pub fn jobs(&self) -> Result<Vec<(JobKind, JobSet)>> {
        self.load_all()
    }

    /// Render one job without writing it
    pub fn render_job(
        &self,
        kind: JobKind,
        repo: &str,
        file: &str,
        job: &JobDefinition,
    ) -> Result<Vec<u8>> {
        if !self.is_configured_org(repo) {
            warn!(
                "{}/{} is outside the configured organizations and will not be cleaned",
                repo, file
            );
        }

        let ctx = RenderContext::build(kind, repo, job, &self.defaults);
        self.renderer
            .render_kind(kind, &ctx)
            .map_err(|source| GenerateError::Render {
                kind,
                repo: repo.to_string(),
                file: file.to_string(),
                source,
            })
    }

    /// Load every configured kind, in order
    ///
    /// Fails when two kinds produce the same output file.
    fn load_all(&self) -> Result<Vec<(JobKind, JobSet)>> {
        let mut owners: BTreeMap<(String, String), JobKind> = BTreeMap::new();
        let mut loaded = Vec::with_capacity(self.config.job_kinds.len());

        for name in &self.config.job_kinds {
            let (kind, jobs) = self.load_kind(name)?;
            for (repo, file, _) in flatten(&jobs) {
                match owners.entry((repo.to_string(), file.to_string())) {
                    Entry::Vacant(entry) => {
                        entry.insert(kind);
                    }
                    Entry::Occupied(entry) => {
                        return Err(GenerateError::Load {
                            kind: name.clone(),
                            source: LoadError::Conflict {
                                repo: repo.to_string(),
                                file: file.to_string(),
                                first: *entry.get(),
                                second: kind,
                            },
                        });
                    }
                }
            }
            loaded.push((kind, jobs));
        }

        Ok(loaded)
    }

    /// Load the jobs of one configured kind, given by name
    fn load_kind(&self, name: &str) -> Result<(JobKind, JobSet)> {
        let load_err = |source| GenerateError::Load {
            kind: name.to_string(),
            source,
        };
        let jobs = self.source.load(name).map_err(load_err)?;
        let kind = name
            .parse::<JobKind>()
            .map_err(|e| load_err(LoadError::from(e)))?;
        Ok((kind, jobs))
    }

    fn is_configured_org(&self, repo: &str) -> bool {
        let org = repo.split('/').next().unwrap_or_default();
        self.config.organizations.iter().any(|o| o == org)
    }
}

fn flatten(jobs: &JobSet) -> impl Iterator<Item = (&str, &str, &JobDefinition)> {
    jobs.iter().flat_map(|(repo, files)| {
        files
            .iter()
            .map(move |(file, job)| (repo.as_str(), file.as_str(), job))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::StaticJobSource;
    use std::cell::RefCell;
    use std::fs;
    use tempfile::TempDir;

    fn presubmit(name: &str) -> JobDefinition {
        JobDefinition {
            job_name: name.to_string(),
            commands: vec!["make build".to_string()],
            ..Default::default()
        }
    }

    fn generator(root: &TempDir, source: StaticJobSource) -> Generator<StaticJobSource> {
        Generator::new(GeneratorConfig::new(root.path().join("jobs")), source)
    }

    #[test]
    fn test_generate_writes_rendered_presubmit() {
        let root = TempDir::new().unwrap();
        let job = presubmit("foo-presubmit");
        let source =
            StaticJobSource::new().with_job(JobKind::Presubmit, "rcrozean/foo", "bar.yaml", job.clone());
        let generator = generator(&root, source);

        let report = generator.generate().unwrap();

        let path = root.path().join("jobs/rcrozean/foo/bar.yaml");
        assert_eq!(report.written, vec![path.clone()]);
        assert_eq!(report.per_kind[&JobKind::Presubmit], 1);
        assert_eq!(report.per_kind[&JobKind::Periodic], 0);

        let expected_ctx = RenderContext::build(
            JobKind::Presubmit,
            "rcrozean/foo",
            &job,
            &ContextDefaults::default(),
        );
        let expected = TemplateRenderer::new()
            .render_kind(JobKind::Presubmit, &expected_ctx)
            .unwrap();
        assert_eq!(fs::read(&path).unwrap(), expected);
    }

    #[test]
    fn test_generate_is_idempotent() {
        let root = TempDir::new().unwrap();
        let source = StaticJobSource::new()
            .with_job(JobKind::Presubmit, "rcrozean/foo", "bar.yaml", presubmit("foo"))
            .with_job(JobKind::Postsubmit, "rcrozean/foo", "baz.yaml", presubmit("baz"));
        let generator = generator(&root, source);

        generator.generate().unwrap();
        let first = fs::read(root.path().join("jobs/rcrozean/foo/baz.yaml")).unwrap();
        generator.generate().unwrap();
        let second = fs::read(root.path().join("jobs/rcrozean/foo/baz.yaml")).unwrap();

        assert_eq!(first, second);
        assert!(generator.check().unwrap().is_clean());
    }

    #[test]
    fn test_generate_removes_stale_output() {
        let root = TempDir::new().unwrap();
        let mut source = StaticJobSource::new()
            .with_job(JobKind::Presubmit, "rcrozean/foo", "bar.yaml", presubmit("bar"))
            .with_job(JobKind::Presubmit, "rcrozean/old", "gone.yaml", presubmit("gone"));
        generator(&root, source.clone()).generate().unwrap();
        assert!(root.path().join("jobs/rcrozean/old/gone.yaml").exists());

        source.remove(JobKind::Presubmit, "rcrozean/old", "gone.yaml");
        generator(&root, source).generate().unwrap();

        assert!(!root.path().join("jobs/rcrozean/old").exists());
        assert!(root.path().join("jobs/rcrozean/foo/bar.yaml").exists());
    }

    #[test]
    fn test_unknown_job_kind_fails_run() {
        let root = TempDir::new().unwrap();
        let config = GeneratorConfig::new(root.path().join("jobs"))
            .with_job_kinds(vec!["presubmit".to_string(), "nightly".to_string()]);
        let generator = Generator::new(config, StaticJobSource::new());

        let err = generator.generate().unwrap_err();
        assert!(err.is_load_error());
        assert!(err.to_string().contains("nightly"));
        assert!(generator.jobs().is_err());
    }

    #[test]
    fn test_kinds_load_by_name() {
        struct Recording {
            inner: StaticJobSource,
            loaded: RefCell<Vec<String>>,
        }

        impl JobSource for Recording {
            fn jobs(&self, kind: JobKind) -> std::result::Result<JobSet, LoadError> {
                self.inner.jobs(kind)
            }

            fn load(&self, kind: &str) -> std::result::Result<JobSet, LoadError> {
                self.loaded.borrow_mut().push(kind.to_string());
                self.inner.load(kind)
            }
        }

        let root = TempDir::new().unwrap();
        let source = Recording {
            inner: StaticJobSource::new()
                .with_job(JobKind::Presubmit, "rcrozean/foo", "bar.yaml", presubmit("bar")),
            loaded: RefCell::new(Vec::new()),
        };
        let config = GeneratorConfig::new(root.path().join("jobs"))
            .with_job_kinds(vec!["presubmit".to_string(), "periodic".to_string()]);
        let generator = Generator::new(config, source);

        generator.generate().unwrap();
        assert_eq!(*generator.source.loaded.borrow(), vec!["presubmit", "periodic"]);
    }

    #[test]
    fn test_same_output_from_two_kinds_is_rejected() {
        let root = TempDir::new().unwrap();
        let jobs_root = root.path().join("jobs");
        let previous = jobs_root.join("rcrozean/foo/keep.yaml");
        fs::create_dir_all(previous.parent().unwrap()).unwrap();
        fs::write(&previous, b"previous run\n").unwrap();

        let source = StaticJobSource::new()
            .with_job(JobKind::Presubmit, "rcrozean/foo", "bar.yaml", presubmit("bar"))
            .with_job(JobKind::Postsubmit, "rcrozean/foo", "bar.yaml", presubmit("bar"));
        let generator = Generator::new(GeneratorConfig::new(&jobs_root), source);

        let err = generator.generate().unwrap_err();
        assert!(err.is_load_error());
        assert!(matches!(
            err,
            GenerateError::Load {
                source: LoadError::Conflict {
                    first: JobKind::Postsubmit,
                    second: JobKind::Presubmit,
                    ..
                },
                ..
            }
        ));
        assert!(err.to_string().contains("rcrozean/foo/bar.yaml"));

        // nothing is cleaned or written when loading fails
        assert!(previous.exists());
        assert!(!jobs_root.join("rcrozean/foo/bar.yaml").exists());
        assert!(generator.check().is_err());
        assert!(generator.jobs().is_err());
    }

    #[test]
    fn test_check_reports_drift() {
        let root = TempDir::new().unwrap();
        let source = StaticJobSource::new()
            .with_job(JobKind::Presubmit, "rcrozean/foo", "a.yaml", presubmit("a"))
            .with_job(JobKind::Presubmit, "rcrozean/foo", "b.yaml", presubmit("b"));
        let generator = generator(&root, source);

        let before = generator.check().unwrap();
        assert_eq!(
            before.missing,
            vec![PathBuf::from("rcrozean/foo/a.yaml"), PathBuf::from("rcrozean/foo/b.yaml")]
        );

        generator.generate().unwrap();
        let jobs_root = root.path().join("jobs");
        fs::write(jobs_root.join("rcrozean/foo/a.yaml"), b"edited by hand\n").unwrap();
        fs::write(jobs_root.join("rcrozean/foo/leftover.yaml"), b"old\n").unwrap();

        let after = generator.check().unwrap();
        assert!(after.missing.is_empty());
        assert_eq!(after.outdated, vec![PathBuf::from("rcrozean/foo/a.yaml")]);
        assert_eq!(after.stale, vec![PathBuf::from("rcrozean/foo/leftover.yaml")]);
        assert!(!after.is_clean());
    }

    #[test]
    fn test_write_error_names_job() {
        let root = TempDir::new().unwrap();
        let jobs_root = root.path().join("jobs");
        fs::create_dir_all(&jobs_root).unwrap();
        fs::write(jobs_root.join("acme"), b"not a directory").unwrap();

        let source = StaticJobSource::new()
            .with_job(JobKind::Presubmit, "acme/foo", "bar.yaml", presubmit("foo"));
        let config = GeneratorConfig::new(&jobs_root).with_organizations(vec!["rcrozean".to_string()]);

        let err = Generator::new(config, source).generate().unwrap_err();
        assert!(matches!(err, GenerateError::Write { .. }));
        assert!(err.to_string().contains("acme/foo/bar.yaml"));
    }

    #[test]
    fn test_jobs_lists_configured_kinds_in_order() {
        let root = TempDir::new().unwrap();
        let source = StaticJobSource::new()
            .with_job(JobKind::Periodic, "rcrozean/foo", "nightly.yaml", presubmit("nightly"));
        let config = GeneratorConfig::new(root.path().join("jobs"))
            .with_job_kinds(vec!["presubmit".to_string(), "periodic".to_string()]);
        let jobs = Generator::new(config, source).jobs().unwrap();

        assert_eq!(jobs.len(), 2);
        assert_eq!(jobs[0].0, JobKind::Presubmit);
        assert!(jobs[0].1.is_empty());
        assert_eq!(jobs[1].0, JobKind::Periodic);
        assert_eq!(jobs[1].1["rcrozean/foo"].len(), 1);
    }
}
