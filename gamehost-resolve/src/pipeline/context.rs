//! State passed through the pipeline phases.

use gamehost_ir::{OutputSet, Resolution, ResourceGraph, ResourceNode};
use gamehost_template::Template;

use super::diagnostic::{Diagnostic, Severity};
use crate::{ParameterSet, eval::{Evaluator, Instance}};

/// Context passed through all pipeline phases.
///
/// Each phase fills in its part: `instances` after evaluate, `nodes` after
/// expand, `graph` after link and `outputs` last.
pub struct ResolveContext<'a> {
    pub template: &'a Template,
    pub parameters: &'a ParameterSet,
    pub(crate) evaluator: Evaluator<'a>,
    /// Every instance of every declaration, included or not.
    pub instances: Vec<Instance>,
    /// Rendered nodes of the included instances, without edges.
    pub nodes: Vec<ResourceNode>,
    pub graph: ResourceGraph,
    pub outputs: OutputSet,
    pub diagnostics: Vec<Diagnostic>,
}

impl<'a> ResolveContext<'a> {
    pub fn new(template: &'a Template, parameters: &'a ParameterSet) -> Self {
        Self {
            template,
            parameters,
            evaluator: Evaluator::new(template, parameters.scope().clone()),
            instances: Vec::new(),
            nodes: Vec::new(),
            graph: ResourceGraph {
                template: template.meta.clone(),
                resources: Vec::new(),
                excluded: Vec::new(),
            },
            outputs: OutputSet::new(),
            diagnostics: Vec::new(),
        }
    }

    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(|d| d.severity.is_error())
    }

    pub fn has_warnings(&self) -> bool {
        self.diagnostics.iter().any(|d| d.severity.is_warning())
    }

    pub fn error_count(&self) -> usize {
        self.errors().count()
    }

    pub fn warning_count(&self) -> usize {
        self.warnings().count()
    }

    pub fn errors(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics
            .iter()
            .filter(|d| matches!(d.severity, Severity::Error))
    }

    pub fn warnings(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics
            .iter()
            .filter(|d| matches!(d.severity, Severity::Warning))
    }

    pub fn add_diagnostic(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    /// Consume the context into the resolved graph and outputs.
    pub fn into_resolution(self) -> Resolution {
        Resolution {
            graph: self.graph,
            outputs: self.outputs,
        }
    }
}
