//! Lint for names declared in more than one namespace.

use gamehost_template::Template;

use super::super::Lint;
use crate::pipeline::Diagnostic;

/// Lint that rejects a name used by two of parameters, variables and
/// resources, since expressions could not tell them apart.
pub struct DuplicateSymbolLint;

impl Lint for DuplicateSymbolLint {
    fn name(&self) -> &'static str {
        "duplicate-symbol"
    }

    fn description(&self) -> &'static str {
        "Parameters, variables and resources do not share names"
    }

    fn check(&self, template: &Template, diagnostics: &mut Vec<Diagnostic>) {
        let namespaces: [(&str, Vec<&String>); 3] = [
            ("parameter", template.parameters.keys().collect()),
            ("variable", template.variables.keys().collect()),
            ("resource", template.resources.keys().collect()),
        ];

        for (i, (kind, names)) in namespaces.iter().enumerate() {
            for (other, other_names) in &namespaces[i + 1..] {
                for name in names.iter().filter(|n| other_names.contains(*n)) {
                    diagnostics.push(
                        Diagnostic::error(
                            self.name(),
                            format!("'{}' is declared as both a {} and a {}", name, kind, other),
                        )
                        .at(format!("{}s.{}", other, name)),
                    );
                }
            }
        }
    }
}
