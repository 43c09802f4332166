//! Prowgen Render
//!
//! Turns declarative job definitions into Prow job configuration files.
//! It includes:
//! - Job sources: YAML definition directories and in-memory definitions
//! - Render context: the typed fields templates can reference
//! - Template renderer and the embedded per-kind templates
//! - Output writer and the generation pipeline tying it all together

pub mod context;
pub mod error;
pub mod generator;
pub mod renderer;
pub mod source;
pub mod templates;
pub mod workspace;
pub mod writer;

pub use context::{ContextDefaults, RenderContext};
pub use error::{
    GenerateError, LoadError, PathResolutionError, RenderError, Result, WriteError,
};
pub use generator::{CheckReport, GenerationReport, Generator, GeneratorConfig};
pub use renderer::TemplateRenderer;
pub use source::{DirectoryJobSource, JobSource, StaticJobSource};
pub use workspace::{jobs_root, locate_repo_root};
pub use writer::JobWriter;
