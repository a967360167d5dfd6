//! Lint for parameters nothing reads.

use std::collections::HashSet;

use gamehost_template::Template;

use super::{super::Lint, sites};
use crate::pipeline::Diagnostic;

/// Lint that warns about declared parameters that no expression references.
pub struct UnusedParameterLint;

impl Lint for UnusedParameterLint {
    fn name(&self) -> &'static str {
        "unused-parameter"
    }

    fn description(&self) -> &'static str {
        "Every declared parameter is referenced somewhere"
    }

    fn check(&self, template: &Template, diagnostics: &mut Vec<Diagnostic>) {
        let used: HashSet<String> = sites(template)
            .iter()
            .flat_map(|site| site.value.references())
            .collect();

        for name in template.parameters.keys() {
            if !used.contains(name) {
                diagnostics.push(
                    Diagnostic::warning(
                        self.name(),
                        format!("parameter '{}' is never used", name),
                    )
                    .at(format!("parameters.{}", name)),
                );
            }
        }
    }
}
