//! Lint for names that are not declared anywhere.

use gamehost_template::Template;

use super::{super::Lint, sites};
use crate::pipeline::Diagnostic;

/// Lint that rejects references to undeclared names.
///
/// `item` and `index` are only defined inside a `for_each` resource.
pub struct UndeclaredReferenceLint;

impl Lint for UndeclaredReferenceLint {
    fn name(&self) -> &'static str {
        "undeclared-reference"
    }

    fn description(&self) -> &'static str {
        "Every name in an expression is a parameter, variable, resource or loop variable"
    }

    fn check(&self, template: &Template, diagnostics: &mut Vec<Diagnostic>) {
        for site in sites(template) {
            for name in site.value.references() {
                let loop_variable = matches!(name.as_str(), "item" | "index");
                if template.declares(&name) || (loop_variable && site.in_loop) {
                    continue;
                }
                let message = if loop_variable {
                    format!("'{}' uses '{}' outside of a for_each resource", site.location, name)
                } else {
                    format!("'{}' references undeclared name '{}'", site.location, name)
                };
                diagnostics.push(Diagnostic::error(self.name(), message).at(&site.location));
            }
        }
    }
}
