//! Template renderer
//!
//! Uses minijinja with strict undefined handling: a template that references
//! a field the context does not define fails instead of rendering blank.

use minijinja::{Environment, UndefinedBehavior};
use prowgen_core::JobKind;

use crate::context::RenderContext;
use crate::error::RenderError;
use crate::templates;

/// Renders job contexts into Prow job YAML
pub struct TemplateRenderer {
    env: Environment<'static>,
}

impl Default for TemplateRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl TemplateRenderer {
    pub fn new() -> Self {
        let mut env = Environment::new();
        env.set_undefined_behavior(UndefinedBehavior::Strict);
        env.set_keep_trailing_newline(true);
        Self { env }
    }

    /// Render template text with the given context
    ///
    /// # Errors
    /// Returns `RenderError` if the template syntax is invalid or it
    /// references a field the context does not define.
    pub fn render(&self, template: &str, ctx: &RenderContext) -> Result<Vec<u8>, RenderError> {
        let rendered = self.env.render_str(template, ctx)?;
        Ok(rendered.into_bytes())
    }

    /// Render the embedded template for a job kind
    pub fn render_kind(&self, kind: JobKind, ctx: &RenderContext) -> Result<Vec<u8>, RenderError> {
        self.render(templates::template_for(kind), ctx)
    }
}
