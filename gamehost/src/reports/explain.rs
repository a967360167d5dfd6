//! Explain command report data structures.

use std::path::PathBuf;

use super::output::{Output, Report};

/// Report data from template explanation.
#[derive(Debug)]
pub struct ExplainReport {
    /// Path to the template, or `builtin:<name>`.
    pub source: PathBuf,
    pub template: TemplateInfo,
    /// Resolution phases, in run order.
    pub phases: Vec<PhaseInfo>,
    /// Static lints run by the validate phase.
    pub lints: Vec<LintInfo>,
    pub parameters: Vec<ParameterInfo>,
    /// Variable names, in declaration order.
    pub variables: Vec<String>,
    pub resources: Vec<ResourceInfo>,
    pub outputs: Vec<OutputInfo>,
}

#[derive(Debug)]
pub struct TemplateInfo {
    pub name: String,
    pub version: String,
    pub description: Option<String>,
}

/// Information about a pipeline phase.
#[derive(Debug)]
pub struct PhaseInfo {
    pub name: String,
    pub description: String,
}

/// Information about a validation lint.
#[derive(Debug)]
pub struct LintInfo {
    pub name: String,
    pub description: String,
}

#[derive(Debug)]
pub struct ParameterInfo {
    pub name: String,
    pub type_name: String,
    pub required: bool,
    pub secure: bool,
    /// Literal default, `computed`, or where a secure value is read from.
    pub default: Option<String>,
}

#[derive(Debug)]
pub struct ResourceInfo {
    pub symbol: String,
    pub resource_type: String,
    pub parent: Option<String>,
    pub conditional: bool,
    pub for_each: bool,
}

#[derive(Debug)]
pub struct OutputInfo {
    pub name: String,
    pub type_name: String,
    pub conditional: bool,
}

impl Report for ExplainReport {
    fn render(&self, out: &mut dyn Output) {
        out.title("Gamehost Resolution Explanation");
        out.newline();

        out.key_value("Input", &self.source.display().to_string());
        out.key_value_indented("Template", &self.template.name);
        out.key_value_indented("Version", &self.template.version);
        if let Some(description) = &self.template.description {
            out.key_value_indented("Description", description);
        }
        out.newline();

        out.section("Resolution Phases");
        for (i, phase) in self.phases.iter().enumerate() {
            out.numbered_item(i + 1, &format!("{} - {}", phase.name, phase.description));
        }
        out.newline();

        out.section("Validation Lints");
        for lint in &self.lints {
            out.list_item(&format!("{}: {}", lint.name, lint.description));
        }
        out.newline();

        out.section("Parameters");
        for param in &self.parameters {
            let mut text = format!("{} ({})", param.name, param.type_name);
            if param.secure {
                text.push_str(" [secure]");
            }
            if param.required {
                text.push_str(" [required]");
            }
            out.list_item(&text);
            if let Some(default) = &param.default {
                out.key_value_indented("  default", default);
            }
        }
        out.newline();

        if !self.variables.is_empty() {
            out.section("Variables");
            for name in &self.variables {
                out.list_item(name);
            }
            out.newline();
        }

        out.section("Resources");
        for resource in &self.resources {
            let mut text = format!("{} ({})", resource.symbol, resource.resource_type);
            if resource.conditional {
                text.push_str(" [conditional]");
            }
            if resource.for_each {
                text.push_str(" [for_each]");
            }
            out.list_item(&text);
            if let Some(parent) = &resource.parent {
                out.key_value_indented("  parent", parent);
            }
        }

        if !self.outputs.is_empty() {
            out.newline();
            out.section("Outputs");
            for output in &self.outputs {
                let mut text = format!("{} ({})", output.name, output.type_name);
                if output.conditional {
                    text.push_str(" [conditional]");
                }
                out.list_item(&text);
            }
        }
    }
}
