//! Lint for parameters without a description.

use gamehost_template::Template;

use super::super::Lint;
use crate::pipeline::Diagnostic;

/// Lint that warns about parameters missing descriptions.
pub struct MissingDescriptionLint;

impl Lint for MissingDescriptionLint {
    fn name(&self) -> &'static str {
        "missing-description"
    }

    fn description(&self) -> &'static str {
        "Parameters carry a description for 'gamehost explain' and 'gamehost init'"
    }

    fn check(&self, template: &Template, diagnostics: &mut Vec<Diagnostic>) {
        for (name, param) in &template.parameters {
            let described = param
                .description
                .as_deref()
                .is_some_and(|d| !d.trim().is_empty());
            if !described {
                diagnostics.push(
                    Diagnostic::warning(
                        self.name(),
                        format!("parameter '{}' has no description", name),
                    )
                    .at(format!("parameters.{}", name)),
                );
            }
        }
    }
}
