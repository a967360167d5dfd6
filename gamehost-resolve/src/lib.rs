//! Resolution of gamehost templates into a resource graph.
//!
//! [`resolve`] runs the [`pipeline::Pipeline`] over a parsed template and a
//! [`ParameterSet`], producing a [`Resolution`]: the included resource nodes
//! with their dependency edges, plus the named outputs. Resolution is pure and
//! deterministic; it either succeeds completely or returns one
//! [`ResolveError`].
//!
//! ```ignore
//! use gamehost_resolve::{ParameterSet, resolve};
//! use gamehost_template::TemplateFile;
//!
//! let file = TemplateFile::builtin("pixelmon")?;
//! let mut params = ParameterSet::new();
//! params.insert("containerGroupName", "Pixelmon-Server");
//! params.insert_secure("curseForgeApiKey", key);
//!
//! let resolution = resolve(file.template(), &params)?;
//! println!("{}", serde_json::to_string_pretty(&resolution)?);
//! ```

// Miette's derive macro generates code that triggers these warnings
#![allow(unused_assignments)]

mod error;
mod eval;
mod params;
pub mod pipeline;

pub use error::{ResolveError, Result};
pub use eval::Instance;
use gamehost_ir::Resolution;
use gamehost_template::Template;
pub use params::{ParameterSet, Supplied};
use pipeline::{Diagnostic, Phase, Pipeline, ResolveContext, phases::ValidatePhase};

/// Resolve a template against a parameter set.
#[tracing::instrument(skip_all, fields(template = %template.meta.name))]
pub fn resolve(template: &Template, parameters: &ParameterSet) -> Result<Resolution> {
    let ctx = Pipeline::new().run(template, parameters)?;
    tracing::debug!(
        resources = ctx.graph.len(),
        excluded = ctx.graph.excluded.len(),
        outputs = ctx.outputs.len(),
        "resolved"
    );
    Ok(ctx.into_resolution())
}

/// Run the static lints over a template without binding parameters.
///
/// Returns the warnings on success; any lint error fails with
/// [`ResolveError::InvalidTemplate`].
#[tracing::instrument(skip_all, fields(template = %template.meta.name))]
pub fn validate(template: &Template) -> Result<Vec<Diagnostic>> {
    let parameters = ParameterSet::new();
    let mut ctx = ResolveContext::new(template, &parameters);
    ValidatePhase::new().run(&mut ctx)?;
    Ok(ctx.diagnostics)
}
