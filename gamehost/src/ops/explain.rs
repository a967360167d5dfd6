//! Explain operation - what resolution does with a template.

use std::path::Path;

use eyre::Result;
use gamehost_resolve::pipeline::{Pipeline, phases::ValidatePhase};
use gamehost_template::{Parameter, Template, secret_env_var};

use crate::reports::{
    ExplainReport, LintInfo, OutputInfo, ParameterInfo, PhaseInfo, ResourceInfo, TemplateInfo,
};

/// Execute the explain operation.
///
/// Collects the pipeline phases and lints plus what the template declares.
/// Nothing is resolved, so no parameters are needed.
pub fn explain(template: &Template, source: &Path) -> Result<ExplainReport> {
    let pipeline = Pipeline::new();
    let validate_phase = ValidatePhase::new();

    let phases = pipeline
        .phase_info()
        .into_iter()
        .map(|p| PhaseInfo {
            name: p.name.to_string(),
            description: p.description.to_string(),
        })
        .collect();

    let lints = validate_phase
        .lint_info()
        .into_iter()
        .map(|l| LintInfo {
            name: l.name.to_string(),
            description: l.description.to_string(),
        })
        .collect();

    let parameters = template.parameters.values().map(parameter_info).collect();

    let resources = template
        .resources
        .values()
        .map(|r| ResourceInfo {
            symbol: r.symbol.clone(),
            resource_type: r.resource_type.clone(),
            parent: r.parent.clone(),
            conditional: r.is_conditional(),
            for_each: r.is_loop(),
        })
        .collect();

    let outputs = template
        .outputs
        .values()
        .map(|o| OutputInfo {
            name: o.name.clone(),
            type_name: o.ty.to_string(),
            conditional: o.condition.is_some(),
        })
        .collect();

    Ok(ExplainReport {
        source: source.to_path_buf(),
        template: TemplateInfo {
            name: template.meta.name.clone(),
            version: template.meta.version.clone(),
            description: template.meta.description.clone(),
        },
        phases,
        lints,
        parameters,
        variables: template.variables.keys().cloned().collect(),
        resources,
        outputs,
    })
}

fn parameter_info(param: &Parameter) -> ParameterInfo {
    let default = if param.secure {
        Some(format!("from {}", secret_env_var(&param.name)))
    } else {
        param.default.as_ref().map(|d| match d.as_literal() {
            Some(literal) => literal.to_string(),
            None => "computed".to_string(),
        })
    };

    ParameterInfo {
        name: param.name.clone(),
        type_name: param.ty.to_string(),
        required: param.is_required(),
        secure: param.secure,
        default,
    }
}
