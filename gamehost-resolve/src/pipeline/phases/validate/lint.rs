//! Lint trait for template validation.

use gamehost_template::Template;

use crate::pipeline::Diagnostic;

/// Name and description of a lint, shown by `gamehost explain`.
#[derive(Debug, Clone)]
pub struct LintInfo {
    pub name: &'static str,
    pub description: &'static str,
}

/// A static check over a template. Runs before any parameter is bound.
pub trait Lint: Send + Sync {
    /// The name of this lint, used as the diagnostic source.
    fn name(&self) -> &'static str;

    fn description(&self) -> &'static str;

    /// Check the template and add any diagnostics.
    fn check(&self, template: &Template, diagnostics: &mut Vec<Diagnostic>);

    fn info(&self) -> LintInfo {
        LintInfo {
            name: self.name(),
            description: self.description(),
        }
    }
}
