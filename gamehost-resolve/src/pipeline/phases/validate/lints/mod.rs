//! Built-in lints for template validation.

mod duplicate_symbol;
mod missing_description;
mod undeclared_reference;
mod unknown_dependency;
mod unused_parameter;

pub use duplicate_symbol::DuplicateSymbolLint;
use gamehost_template::{Template, expr::TemplateValue};
pub use missing_description::MissingDescriptionLint;
pub use undeclared_reference::UndeclaredReferenceLint;
pub use unknown_dependency::UnknownDependencyLint;
pub use unused_parameter::UnusedParameterLint;

/// A place in the template holding an expression.
struct Site<'t> {
    location: String,
    value: &'t TemplateValue,
    /// Inside a `for_each` resource, where `item` and `index` are defined.
    in_loop: bool,
}

fn site(location: String, value: &TemplateValue, in_loop: bool) -> Site<'_> {
    Site {
        location,
        value,
        in_loop,
    }
}

/// Every expression site of a template, in declaration order.
fn sites(template: &Template) -> Vec<Site<'_>> {
    let mut out = Vec::new();

    for (name, param) in &template.parameters {
        if let Some(default) = &param.default {
            out.push(site(format!("parameters.{}.default", name), default, false));
        }
    }
    for (name, variable) in &template.variables {
        out.push(site(format!("variables.{}", name), &variable.value, false));
    }
    for (symbol, resource) in &template.resources {
        let in_loop = resource.is_loop();
        if let Some(condition) = &resource.condition {
            out.push(site(format!("resources.{}.condition", symbol), condition, in_loop));
        }
        if let Some(for_each) = &resource.for_each {
            out.push(site(format!("resources.{}.for_each", symbol), for_each, false));
        }
        out.push(site(format!("resources.{}.name", symbol), &resource.name, in_loop));
        for (key, value) in &resource.body {
            out.push(site(format!("resources.{}.{}", symbol, key), value, in_loop));
        }
    }
    for (name, output) in &template.outputs {
        if let Some(condition) = &output.condition {
            out.push(site(format!("outputs.{}.condition", name), condition, false));
        }
        out.push(site(format!("outputs.{}", name), &output.value, false));
    }
    out
}

#[cfg(test)]
fn parse(body: &str) -> Template {
    let src = format!("[template]\nname = \"test\"\nversion = \"1.0.0\"\n\n{}", body);
    gamehost_template::parse_template(&src, "test.toml").unwrap()
}
