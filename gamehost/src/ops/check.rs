//! Check operation - template validation.

use std::path::Path;

use eyre::Result;
use gamehost_resolve::{
    ParameterSet, ResolveError, pipeline::Severity, resolve, validate,
};
use gamehost_template::Template;

use crate::reports::{CheckReport, ResolvedSummary};

/// Execute the check operation.
///
/// Runs the lints, then resolves the template when `parameters` are given.
/// Template problems end up in the report; only unexpected failures are
/// returned as errors.
pub fn check(
    template: &Template,
    source: &Path,
    parameters: Option<&ParameterSet>,
) -> Result<CheckReport> {
    let diagnostics = match validate(template) {
        Ok(diagnostics) => diagnostics,
        Err(ResolveError::InvalidTemplate { diagnostics, .. }) => diagnostics,
        Err(e) => return Err(e.into()),
    };

    let mut errors = Vec::new();
    let mut warnings = Vec::new();
    let mut infos = Vec::new();

    for diag in &diagnostics {
        let msg = if let Some(loc) = &diag.location {
            format!("{}\n  --> {}", diag.message, loc)
        } else {
            diag.message.clone()
        };

        match diag.severity {
            Severity::Error => errors.push(msg),
            Severity::Warning => warnings.push(msg),
            Severity::Info => infos.push(msg),
        }
    }

    let mut resolved = None;
    if let Some(parameters) = parameters.filter(|_| errors.is_empty()) {
        match resolve(template, parameters) {
            Ok(resolution) => {
                resolved = Some(ResolvedSummary {
                    resource_count: resolution.graph.len(),
                    excluded: resolution.graph.excluded.clone(),
                    output_count: resolution.outputs.len(),
                })
            }
            Err(e) => errors.push(e.to_string()),
        }
    }

    Ok(CheckReport {
        source: source.to_path_buf(),
        template: template.meta.name.clone(),
        version: template.meta.version.clone(),
        errors,
        warnings,
        infos,
        resolved,
    })
}

#[cfg(test)]
mod tests {
    use gamehost_core::SecretString;
    use gamehost_template::TemplateFile;

    use super::*;

    fn parse(content: &str) -> Template {
        content.parse().unwrap()
    }

    #[test]
    fn test_builtin_is_valid() {
        let file = TemplateFile::builtin("pixelmon-logging").unwrap();
        let report = check(file.template(), file.path(), None).unwrap();
        assert!(report.is_valid());
        assert!(report.warnings.is_empty());
        assert!(report.resolved.is_none());
    }

    #[test]
    fn test_lint_errors_are_collected() {
        let template = parse(
            r#"
[template]
name = "broken"
version = "1.0.0"

[resources.share]
type = "Microsoft.Storage/storageAccounts/fileServices/shares"
api_version = "2023-01-01"
name = "${shareName}"
depends_on = ["fileService"]
"#,
        );
        let report = check(&template, Path::new("broken.toml"), None).unwrap();
        assert!(!report.is_valid());
        assert_eq!(report.errors.len(), 2);
        assert!(
            report.errors[0]
                .starts_with("'resources.share.name' references undeclared name 'shareName'")
        );
    }

    #[test]
    fn test_resolves_with_parameters() {
        let file = TemplateFile::builtin("pixelmon-logging").unwrap();
        let mut params = ParameterSet::new();
        params
            .insert("enableLogAnalytics", true)
            .insert_secure("curseForgeApiKey", SecretString::new("cf".to_string()));

        let report = check(file.template(), file.path(), Some(&params)).unwrap();
        assert!(report.is_valid());
        let resolved = report.resolved.unwrap();
        assert!(resolved.resource_count > 4);
        assert!(resolved.excluded.is_empty());
    }

    #[test]
    fn test_resolution_errors_are_reported() {
        let file = TemplateFile::builtin("pixelmon").unwrap();
        let mut params = ParameterSet::new();
        params.insert("memoryInGB", 64i64);

        let report = check(file.template(), file.path(), Some(&params)).unwrap();
        assert!(!report.is_valid());
        assert_eq!(report.errors, ["parameter 'memoryInGB' must be at most 16, found 64"]);
    }
}
