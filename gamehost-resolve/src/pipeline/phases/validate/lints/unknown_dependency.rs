//! Lint for `depends_on` and `parent` entries that name no resource.

use gamehost_template::Template;

use super::super::Lint;
use crate::pipeline::Diagnostic;

/// Lint that checks explicit dependencies and parents point at declared
/// resources. A parent must also be a single resource, not a `for_each`.
pub struct UnknownDependencyLint;

impl Lint for UnknownDependencyLint {
    fn name(&self) -> &'static str {
        "unknown-dependency"
    }

    fn description(&self) -> &'static str {
        "depends_on and parent name declared resources"
    }

    fn check(&self, template: &Template, diagnostics: &mut Vec<Diagnostic>) {
        for (symbol, resource) in &template.resources {
            if let Some(parent) = &resource.parent {
                let location = format!("resources.{}.parent", symbol);
                match template.resources.get(parent) {
                    None => diagnostics.push(
                        Diagnostic::error(
                            self.name(),
                            format!("resource '{}' has unknown parent '{}'", symbol, parent),
                        )
                        .at(location),
                    ),
                    Some(p) if p.is_loop() => diagnostics.push(
                        Diagnostic::error(
                            self.name(),
                            format!(
                                "parent '{}' of resource '{}' is a for_each resource",
                                parent, symbol
                            ),
                        )
                        .at(location),
                    ),
                    Some(_) => {}
                }
            }

            for dependency in &resource.depends_on {
                if !template.resources.contains_key(dependency) {
                    diagnostics.push(
                        Diagnostic::error(
                            self.name(),
                            format!(
                                "resource '{}' depends on unknown resource '{}'",
                                symbol, dependency
                            ),
                        )
                        .at(format!("resources.{}.depends_on", symbol)),
                    );
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::phases::validate::lints::parse;

    #[test]
    fn test_unknown_dependency_and_parent() {
        let template = parse(
            r#"
[resources.fileService]
type = "Microsoft.Storage/storageAccounts/fileServices"
api_version = "2023-01-01"
parent = "storage"
name = "default"

[resources.containerGroup]
type = "Microsoft.ContainerInstance/containerGroups"
api_version = "2023-05-01"
name = "pixelmon"
depends_on = ["fileService", "fileShare"]
"#,
        );

        let mut diagnostics = Vec::new();
        UnknownDependencyLint.check(&template, &mut diagnostics);

        let messages: Vec<&str> = diagnostics.iter().map(|d| d.message.as_str()).collect();
        assert_eq!(
            messages,
            [
                "resource 'fileService' has unknown parent 'storage'",
                "resource 'containerGroup' depends on unknown resource 'fileShare'",
            ]
        );
    }

    #[test]
    fn test_loop_parent() {
        let template = parse(
            r#"
[resources.accounts]
type = "Microsoft.Storage/storageAccounts"
api_version = "2023-01-01"
for_each = ["a", "b"]
name = "${item}"

[resources.fileService]
type = "Microsoft.Storage/storageAccounts/fileServices"
api_version = "2023-01-01"
parent = "accounts"
name = "default"
"#,
        );

        let mut diagnostics = Vec::new();
        UnknownDependencyLint.check(&template, &mut diagnostics);

        assert_eq!(diagnostics.len(), 1);
        assert_eq!(
            diagnostics[0].location.as_deref(),
            Some("resources.fileService.parent")
        );
    }
}
