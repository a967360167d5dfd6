//! Render command report data structures.

use std::path::PathBuf;

use super::output::{Output, Report};

/// Report data from rendering a resolution.
#[derive(Debug)]
pub struct RenderReport {
    pub template: String,
    /// Where the JSON was written, if not to stdout.
    pub output: Option<PathBuf>,
    /// The JSON itself when it goes to stdout.
    pub json: Option<String>,
    pub resource_count: usize,
    pub excluded: Vec<String>,
    pub outputs: Vec<OutputSummary>,
}

#[derive(Debug)]
pub struct OutputSummary {
    pub name: String,
    /// Display form; runtime references render as `[expression]`.
    pub value: String,
}

impl Report for RenderReport {
    fn render(&self, out: &mut dyn Output) {
        // Stdout carries only the JSON so it can be piped.
        if let Some(json) = &self.json {
            out.preformatted(json);
            return;
        }

        let path = self
            .output
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_default();
        out.preformatted(&format!(
            "✓ Rendered '{}' ({} resource{})",
            self.template,
            self.resource_count,
            if self.resource_count == 1 { "" } else { "s" }
        ));
        out.added_item(&path);

        if !self.excluded.is_empty() {
            out.newline();
            out.section("Excluded");
            for id in &self.excluded {
                out.list_item(id);
            }
        }

        if !self.outputs.is_empty() {
            out.newline();
            out.section("Outputs");
            for output in &self.outputs {
                out.key_value_indented(&output.name, &output.value);
            }
        }
    }
}
