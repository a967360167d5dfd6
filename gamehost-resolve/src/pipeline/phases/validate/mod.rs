//! Validate phase - runs lints on the template.

mod lint;
pub mod lints;

pub use lint::{Lint, LintInfo};
pub use lints::{
    DuplicateSymbolLint, MissingDescriptionLint, UndeclaredReferenceLint, UnknownDependencyLint,
    UnusedParameterLint,
};

use crate::{
    ResolveError, Result,
    pipeline::{Phase, ResolveContext},
};

/// Phase that validates the template using configurable lints.
pub struct ValidatePhase {
    lints: Vec<Box<dyn Lint>>,
}

impl ValidatePhase {
    /// Create a new validate phase with default lints.
    pub fn new() -> Self {
        Self {
            lints: vec![
                Box::new(UndeclaredReferenceLint),
                Box::new(DuplicateSymbolLint),
                Box::new(UnknownDependencyLint),
                Box::new(UnusedParameterLint),
                Box::new(MissingDescriptionLint),
            ],
        }
    }

    /// Create a validate phase with no lints.
    pub fn empty() -> Self {
        Self { lints: Vec::new() }
    }

    /// Add a custom lint to the validation phase.
    pub fn with_lint(mut self, lint: impl Lint + 'static) -> Self {
        self.lints.push(Box::new(lint));
        self
    }

    /// Get the names of all lints that will be run.
    pub fn lint_names(&self) -> Vec<&'static str> {
        self.lints.iter().map(|l| l.name()).collect()
    }

    /// Get information about all lints that will be run.
    pub fn lint_info(&self) -> Vec<LintInfo> {
        self.lints.iter().map(|l| l.info()).collect()
    }
}

impl Default for ValidatePhase {
    fn default() -> Self {
        Self::new()
    }
}

impl Phase for ValidatePhase {
    fn name(&self) -> &'static str {
        "validate"
    }

    fn description(&self) -> &'static str {
        "Check references, symbols and dependencies before binding parameters"
    }

    fn run(&self, ctx: &mut ResolveContext<'_>) -> Result<()> {
        for lint in &self.lints {
            lint.check(ctx.template, &mut ctx.diagnostics);
        }

        for warning in ctx.warnings() {
            tracing::warn!(lint = %warning.source, "{}", warning.message);
        }

        // Warnings are allowed
        if ctx.has_errors() {
            return Err(ResolveError::InvalidTemplate {
                count: ctx.error_count(),
                diagnostics: ctx.errors().cloned().collect(),
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use gamehost_template::{Template, parse_template};

    use super::*;
    use crate::{ParameterSet, pipeline::Diagnostic};

    fn template(body: &str) -> Template {
        let src = format!("[template]\nname = \"test\"\nversion = \"1.0.0\"\n\n{}", body);
        parse_template(&src, "test.toml").unwrap()
    }

    #[test]
    fn test_with_errors() {
        struct AlwaysErrorLint;
        impl Lint for AlwaysErrorLint {
            fn name(&self) -> &'static str {
                "always-error"
            }
            fn description(&self) -> &'static str {
                "Always produces an error"
            }
            fn check(&self, _template: &Template, diagnostics: &mut Vec<Diagnostic>) {
                diagnostics.push(Diagnostic::error("always-error", "forced error"));
            }
        }

        let template = template("");
        let params = ParameterSet::new();
        let mut ctx = ResolveContext::new(&template, &params);

        let phase = ValidatePhase::empty().with_lint(AlwaysErrorLint);
        let err = phase.run(&mut ctx).unwrap_err();

        assert_eq!(err.to_string(), "template validation failed with 1 error(s)");
        assert!(ctx.has_errors());
    }

    #[test]
    fn test_warnings_allowed() {
        let template = template(
            r#"
[parameters.serverName]
type = "string"
default = "Pixelmon"

[variables]
motd = "Welcome to ${serverName}"
"#,
        );
        let params = ParameterSet::new();
        let mut ctx = ResolveContext::new(&template, &params);

        let phase = ValidatePhase::empty().with_lint(MissingDescriptionLint);
        phase.run(&mut ctx).unwrap();

        assert!(ctx.has_warnings());
        assert!(!ctx.has_errors());
    }

    #[test]
    fn test_default_lints() {
        assert_eq!(
            ValidatePhase::new().lint_names(),
            [
                "undeclared-reference",
                "duplicate-symbol",
                "unknown-dependency",
                "unused-parameter",
                "missing-description"
            ]
        );
    }
}
