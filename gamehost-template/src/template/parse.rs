//! Template parsing from files and strings.

use std::{path::Path, str::FromStr};

use gamehost_core::{ParamType, Version};
use gamehost_ir::{TemplateMeta, Value};
use indexmap::IndexMap;
use serde::Deserialize;

use super::{Constraints, Output, Parameter, Resource, Template, Variable, validate::ParseContext};
use crate::{
    Error, Result,
    error::SourceContext,
    expr::{TemplateValue, value_from_toml},
};

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawTemplate {
    template: RawMeta,
    #[serde(default)]
    parameters: IndexMap<String, RawParameter>,
    #[serde(default)]
    variables: IndexMap<String, toml::Value>,
    #[serde(default)]
    resources: IndexMap<String, RawResource>,
    #[serde(default)]
    outputs: IndexMap<String, RawOutput>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawMeta {
    name: String,
    version: Version,
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawParameter {
    #[serde(rename = "type")]
    ty: ParamType,
    default: Option<toml::Value>,
    #[serde(default)]
    secure: bool,
    description: Option<String>,
    min: Option<i64>,
    max: Option<i64>,
    min_length: Option<usize>,
    max_length: Option<usize>,
    allowed: Option<Vec<toml::Value>>,
}

#[derive(Debug, Deserialize)]
struct RawResource {
    #[serde(rename = "type")]
    resource_type: String,
    api_version: String,
    name: toml::Value,
    condition: Option<toml::Value>,
    for_each: Option<toml::Value>,
    parent: Option<String>,
    #[serde(default)]
    depends_on: Vec<String>,
    description: Option<String>,
    #[serde(flatten)]
    body: IndexMap<String, toml::Value>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawOutput {
    #[serde(rename = "type")]
    ty: ParamType,
    value: toml::Value,
    condition: Option<toml::Value>,
    description: Option<String>,
}

impl FromStr for Template {
    type Err = Box<Error>;

    fn from_str(s: &str) -> Result<Self> {
        parse_template(s, "template.toml")
    }
}

impl Template {
    /// Parse a template file from the given path.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            Box::new(Error::Io {
                path: path.to_path_buf(),
                source: e,
            })
        })?;
        parse_template(&content, &path.display().to_string())
    }

    /// Parse a template from a string with a custom filename for error reporting.
    pub fn from_str_with_filename(content: &str, filename: &str) -> Result<Self> {
        parse_template(content, filename)
    }
}

/// Parse a template from content with the given filename for error reporting.
pub fn parse_template(content: &str, filename: &str) -> Result<Template> {
    let source_ctx = SourceContext::new(content, filename);
    let raw: RawTemplate = toml::from_str(content).map_err(|e| source_ctx.parse_error(e))?;
    build_template(raw, &ParseContext::new(content, filename))
}

fn build_template(raw: RawTemplate, ctx: &ParseContext) -> Result<Template> {
    if raw.template.name.trim().is_empty() {
        return Err(ctx.push("template").error("template name cannot be empty", "name"));
    }

    let meta = TemplateMeta {
        name: raw.template.name,
        version: raw.template.version.to_string(),
        description: raw.template.description,
    };

    let params_ctx = ctx.push("parameters");
    let mut parameters = IndexMap::with_capacity(raw.parameters.len());
    for (name, param) in &raw.parameters {
        ctx.validate_name(name, "parameter")?;
        let parameter = build_parameter(name, param, &params_ctx.push(name))?;
        parameters.insert(name.clone(), parameter);
    }

    let vars_ctx = ctx.push("variables");
    let mut variables = IndexMap::with_capacity(raw.variables.len());
    for (name, value) in &raw.variables {
        ctx.validate_name(name, "variable")?;
        let value = TemplateValue::compile(value).map_err(|e| vars_ctx.compile_error(name, e))?;
        variables.insert(
            name.clone(),
            Variable {
                name: name.clone(),
                value,
            },
        );
    }

    let res_ctx = ctx.push("resources");
    let mut resources = IndexMap::with_capacity(raw.resources.len());
    for (symbol, resource) in raw.resources {
        ctx.validate_name(&symbol, "resource")?;
        let resource = build_resource(&symbol, resource, &res_ctx.push(&symbol))?;
        resources.insert(symbol, resource);
    }

    let out_ctx = ctx.push("outputs");
    let mut outputs = IndexMap::with_capacity(raw.outputs.len());
    for (name, output) in &raw.outputs {
        ctx.validate_name(name, "output")?;
        let output = build_output(name, output, &out_ctx.push(name))?;
        outputs.insert(name.clone(), output);
    }

    Ok(Template {
        meta,
        parameters,
        variables,
        resources,
        outputs,
    })
}

fn build_parameter(name: &str, raw: &RawParameter, ctx: &ParseContext) -> Result<Parameter> {
    if raw.secure && raw.ty != ParamType::String {
        return Err(ctx.error(
            format!(
                "secure parameter '{}' must be of type 'string', found '{}'",
                name, raw.ty
            ),
            "secure",
        ));
    }
    if raw.secure && raw.default.is_some() {
        return Err(ctx.error(
            format!("secure parameter '{}' cannot declare a default", name),
            "default",
        ));
    }

    if raw.ty != ParamType::Int {
        for (key, set) in [("min", raw.min.is_some()), ("max", raw.max.is_some())] {
            if set {
                return Err(ctx.error(
                    format!("'{}' only applies to int parameters, '{}' is {}", key, name, raw.ty),
                    key,
                ));
            }
        }
    }
    if !raw.ty.has_length() {
        for (key, set) in [
            ("min_length", raw.min_length.is_some()),
            ("max_length", raw.max_length.is_some()),
        ] {
            if set {
                return Err(ctx.error(
                    format!(
                        "'{}' only applies to string and array parameters, '{}' is {}",
                        key, name, raw.ty
                    ),
                    key,
                ));
            }
        }
    }
    if let (Some(min), Some(max)) = (raw.min, raw.max)
        && min > max
    {
        return Err(ctx.error(format!("'min' ({}) is greater than 'max' ({})", min, max), "min"));
    }
    if let (Some(min), Some(max)) = (raw.min_length, raw.max_length)
        && min > max
    {
        return Err(ctx.error(
            format!("'min_length' ({}) is greater than 'max_length' ({})", min, max),
            "min_length",
        ));
    }

    let allowed = match &raw.allowed {
        Some(values) => {
            let mut allowed = Vec::with_capacity(values.len());
            for value in values {
                match value_from_toml(value) {
                    Some(v) if v.conforms_to(raw.ty) => allowed.push(v),
                    _ => {
                        return Err(ctx.error(
                            format!("allowed values for '{}' must be of type {}", name, raw.ty),
                            "allowed",
                        ));
                    }
                }
            }
            Some(allowed)
        }
        None => None,
    };

    let default = match &raw.default {
        Some(value) => {
            let compiled =
                TemplateValue::compile(value).map_err(|e| ctx.compile_error("default", e))?;
            if let Some(literal) = compiled.as_literal()
                && !literal.conforms_to(raw.ty)
            {
                return Err(ctx.error(
                    format!(
                        "default for '{}' must be of type {}, found {}",
                        name,
                        raw.ty,
                        literal.type_name()
                    ),
                    "default",
                ));
            }
            Some(compiled)
        }
        None => None,
    };

    Ok(Parameter {
        name: name.to_string(),
        ty: raw.ty,
        default,
        secure: raw.secure,
        description: raw.description.clone(),
        constraints: Constraints {
            min: raw.min,
            max: raw.max,
            min_length: raw.min_length,
            max_length: raw.max_length,
            allowed,
        },
    })
}

fn build_resource(symbol: &str, raw: RawResource, ctx: &ParseContext) -> Result<Resource> {
    if let Some(reason) = check_resource_type(&raw.resource_type) {
        return Err(ctx.error(
            format!("invalid resource type '{}': {}", raw.resource_type, reason),
            "type",
        ));
    }
    if !is_api_version(&raw.api_version) {
        return Err(ctx.error(
            format!(
                "invalid api_version '{}', expected 'YYYY-MM-DD' or 'YYYY-MM-DD-preview'",
                raw.api_version
            ),
            "api_version",
        ));
    }

    if !raw.name.is_str() {
        return Err(ctx.error(
            format!("name of resource '{}' must be a string", symbol),
            "name",
        ));
    }
    let name = TemplateValue::compile(&raw.name).map_err(|e| ctx.compile_error("name", e))?;

    let condition = raw
        .condition
        .as_ref()
        .map(|c| compile_condition(c, ctx))
        .transpose()?;

    let for_each = match &raw.for_each {
        Some(value @ (toml::Value::String(_) | toml::Value::Array(_))) => {
            Some(TemplateValue::compile(value).map_err(|e| ctx.compile_error("for_each", e))?)
        }
        Some(_) => {
            return Err(ctx.error(
                "for_each must be an array or an expression",
                "for_each",
            ));
        }
        None => None,
    };

    if raw.parent.as_deref() == Some(symbol) || raw.depends_on.iter().any(|d| d == symbol) {
        return Err(ctx.error(
            format!("resource '{}' cannot depend on itself", symbol),
            if raw.parent.is_some() { "parent" } else { "depends_on" },
        ));
    }

    let mut body = IndexMap::with_capacity(raw.body.len());
    for (key, value) in &raw.body {
        let compiled = TemplateValue::compile(value).map_err(|e| ctx.compile_error(key, e))?;
        body.insert(key.clone(), compiled);
    }

    Ok(Resource {
        symbol: symbol.to_string(),
        resource_type: raw.resource_type,
        api_version: raw.api_version,
        name,
        condition,
        for_each,
        parent: raw.parent,
        depends_on: raw.depends_on,
        description: raw.description,
        body,
    })
}

fn build_output(name: &str, raw: &RawOutput, ctx: &ParseContext) -> Result<Output> {
    let value = TemplateValue::compile(&raw.value).map_err(|e| ctx.compile_error("value", e))?;
    if let Some(literal) = value.as_literal()
        && !literal.conforms_to(raw.ty)
    {
        return Err(ctx.error(
            format!(
                "output '{}' is declared {} but its value is {}",
                name,
                raw.ty,
                literal.type_name()
            ),
            "value",
        ));
    }

    Ok(Output {
        name: name.to_string(),
        ty: raw.ty,
        value,
        condition: raw
            .condition
            .as_ref()
            .map(|c| compile_condition(c, ctx))
            .transpose()?,
        description: raw.description.clone(),
    })
}

/// A condition is either a literal bool or an expression string.
fn compile_condition(value: &toml::Value, ctx: &ParseContext) -> Result<TemplateValue> {
    match value {
        toml::Value::Boolean(b) => Ok(TemplateValue::Literal(Value::Bool(*b))),
        toml::Value::String(_) => {
            TemplateValue::compile(value).map_err(|e| ctx.compile_error("condition", e))
        }
        _ => Err(ctx.error("condition must be a bool or an expression", "condition")),
    }
}

/// Resource types look like `Microsoft.Storage/storageAccounts/fileServices`.
fn check_resource_type(ty: &str) -> Option<&'static str> {
    let mut segments = ty.split('/');
    let namespace = segments.next().unwrap_or_default();
    if !namespace.contains('.') {
        return Some("expected a provider namespace such as 'Microsoft.Storage'");
    }
    let rest: Vec<&str> = segments.collect();
    if rest.is_empty() {
        return Some("expected at least one type segment after the namespace");
    }
    if rest.iter().chain([&namespace]).any(|s| s.is_empty()) {
        return Some("empty type segment");
    }
    None
}

fn is_api_version(version: &str) -> bool {
    let date = version.strip_suffix("-preview").unwrap_or(version);
    let parts: Vec<&str> = date.split('-').collect();
    let [year, month, day] = parts.as_slice() else {
        return false;
    };
    let numeric = |s: &str, len: usize| s.len() == len && s.chars().all(|c| c.is_ascii_digit());
    numeric(year, 4) && numeric(month, 2) && numeric(day, 2)
}
