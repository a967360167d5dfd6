//! Check command report data structures.

use std::path::PathBuf;

use super::output::{Output, Report};

/// Report data from template validation.
#[derive(Debug)]
pub struct CheckReport {
    /// Path to the template, or `builtin:<name>`.
    pub source: PathBuf,
    pub template: String,
    pub version: String,
    /// Error messages, from lints or from resolution.
    pub errors: Vec<String>,
    /// Warning messages.
    pub warnings: Vec<String>,
    /// Info messages.
    pub infos: Vec<String>,
    /// Set when parameters were given and resolution succeeded.
    pub resolved: Option<ResolvedSummary>,
}

#[derive(Debug)]
pub struct ResolvedSummary {
    pub resource_count: usize,
    /// Instance ids left out by their condition.
    pub excluded: Vec<String>,
    pub output_count: usize,
}

impl CheckReport {
    /// Whether the check passed (no errors).
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }
}

impl Report for CheckReport {
    fn render(&self, out: &mut dyn Output) {
        for error in &self.errors {
            out.warning(&format!("error: {}", error));
        }

        for warning in &self.warnings {
            out.warning(&format!("warning: {}", warning));
        }

        for info in &self.infos {
            out.preformatted(&format!("info: {}", info));
        }

        if !self.warnings.is_empty() || !self.errors.is_empty() {
            out.newline();
        }

        if !self.is_valid() {
            return;
        }

        out.preformatted(&format!("✓ {} is valid", self.source.display()));
        out.newline();
        out.preformatted(&format!("  {} v{}", self.template, self.version));

        if let Some(resolved) = &self.resolved {
            out.key_value_indented(
                "Resources",
                &format!(
                    "{} included, {} excluded",
                    resolved.resource_count,
                    resolved.excluded.len()
                ),
            );
            for id in &resolved.excluded {
                out.list_item(&format!("{} (condition is false)", id));
            }
            out.key_value_indented("Outputs", &resolved.output_count.to_string());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reports::Recorder;

    fn report() -> CheckReport {
        CheckReport {
            source: PathBuf::from("builtin:pixelmon-logging"),
            template: "pixelmon-logging".to_string(),
            version: "1.0.0".to_string(),
            errors: Vec::new(),
            warnings: vec![
                "parameter 'motd' has no description\n  --> parameters.motd".to_string(),
            ],
            infos: Vec::new(),
            resolved: Some(ResolvedSummary {
                resource_count: 4,
                excluded: vec!["logAnalytics".to_string(), "storageDiagnostics".to_string()],
                output_count: 3,
            }),
        }
    }

    #[test]
    fn test_render_valid() {
        insta::assert_snapshot!(Recorder::render(&report()), @r"
        [stderr] warning: parameter 'motd' has no description
          --> parameters.motd

        ✓ builtin:pixelmon-logging is valid

          pixelmon-logging v1.0.0
          Resources: 4 included, 2 excluded
          - logAnalytics (condition is false)
          - storageDiagnostics (condition is false)
          Outputs: 3
        ");
    }

    #[test]
    fn test_render_invalid() {
        let mut report = report();
        report.warnings.clear();
        report.resolved = None;
        report.errors.push("missing required parameter 'curseForgeApiKey'".to_string());

        assert!(!report.is_valid());
        insta::assert_snapshot!(Recorder::render(&report), @"
        [stderr] error: missing required parameter 'curseForgeApiKey'
        ");
    }
}
