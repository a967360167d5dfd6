//! Parameter files: values for a template's parameters plus the deployment scope.

use std::{fmt::Write, path::Path, str::FromStr};

use gamehost_core::{ParamType, to_screaming_snake_case, toml_value_to_string};
use gamehost_ir::Value;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::{Error, ParseContext, Result, Template, error::SourceContext, expr::value_from_toml};

/// Prefix of the environment variables secure parameters are read from.
pub const SECRET_ENV_PREFIX: &str = "GAMEHOST_";

/// Environment variable a secure parameter is read from by default,
/// e.g. `curseForgeApiKey` -> `GAMEHOST_CURSE_FORGE_API_KEY`.
pub fn secret_env_var(name: &str) -> String {
    format!("{}{}", SECRET_ENV_PREFIX, to_screaming_snake_case(name))
}

/// Where the template is deployed. Feeds `resourceGroup()`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct Scope {
    pub subscription: String,
    pub resource_group: String,
    pub location: String,
}

impl Default for Scope {
    fn default() -> Self {
        Self {
            subscription: "00000000-0000-0000-0000-000000000000".to_string(),
            resource_group: "gamehost".to_string(),
            location: "eastus".to_string(),
        }
    }
}

impl Scope {
    /// Fully qualified id of the resource group.
    pub fn resource_group_id(&self) -> String {
        format!(
            "/subscriptions/{}/resourceGroups/{}",
            self.subscription, self.resource_group
        )
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawParameterFile {
    #[serde(default)]
    scope: Scope,
    #[serde(default)]
    parameters: toml::Table,
}

/// A parsed parameter file. Values are plain data; `${` is not interpreted.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParameterFile {
    pub scope: Scope,
    pub values: IndexMap<String, Value>,
}

impl FromStr for ParameterFile {
    type Err = Box<Error>;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_str_with_filename(s, "parameters.toml")
    }
}

impl ParameterFile {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            Box::new(Error::Io {
                path: path.to_path_buf(),
                source: e,
            })
        })?;
        Self::from_str_with_filename(&content, &path.display().to_string())
    }

    pub fn from_str_with_filename(content: &str, filename: &str) -> Result<Self> {
        let source_ctx = SourceContext::new(content, filename);
        let raw: RawParameterFile =
            toml::from_str(content).map_err(|e| source_ctx.parse_error(e))?;

        let ctx = ParseContext::new(content, filename).push("parameters");
        let mut values = IndexMap::with_capacity(raw.parameters.len());
        for (name, value) in &raw.parameters {
            let converted = value_from_toml(value).ok_or_else(|| {
                ctx.error(
                    format!(
                        "unsupported value '{}' for parameter '{}': float and datetime values are not supported",
                        toml_value_to_string(value),
                        name
                    ),
                    name,
                )
            })?;
            values.insert(name.clone(), converted);
        }

        Ok(Self {
            scope: raw.scope,
            values,
        })
    }

    /// Render a commented parameter file for `template`.
    ///
    /// Required parameters get a placeholder, optional ones are commented out
    /// with their default, and secure ones only mention their environment
    /// variable.
    pub fn skeleton(template: &Template) -> String {
        let mut out = String::new();
        let scope = Scope::default();
        let _ = writeln!(
            out,
            "# Parameters for the '{}' template ({})",
            template.meta.name, template.meta.version
        );
        if let Some(description) = &template.meta.description {
            let _ = writeln!(out, "# {}", description);
        }
        let _ = writeln!(out);
        let _ = writeln!(out, "[scope]");
        let _ = writeln!(out, "# subscription = {}", toml_string(&scope.subscription));
        let _ = writeln!(out, "# resource_group = {}", toml_string(&scope.resource_group));
        let _ = writeln!(out, "# location = {}", toml_string(&scope.location));
        let _ = writeln!(out);
        let _ = writeln!(out, "[parameters]");

        for param in template.parameters.values() {
            let _ = writeln!(out);
            if let Some(description) = &param.description {
                let _ = writeln!(out, "# {}", description);
            }
            if param.secure {
                let _ = writeln!(
                    out,
                    "# {} is secure: set {} or pass --prompt-secrets",
                    param.name,
                    secret_env_var(&param.name)
                );
                continue;
            }
            match param.default.as_ref().map(|d| d.as_literal()) {
                None => {
                    let _ = writeln!(out, "{} = {}", param.name, placeholder(param.ty));
                }
                Some(Some(literal)) => {
                    let rendered = to_toml(literal)
                        .map(|v| v.to_string())
                        .unwrap_or_else(|| literal.to_string());
                    let _ = writeln!(out, "# {} = {}", param.name, rendered);
                }
                Some(None) => {
                    let _ = writeln!(out, "# {} = (computed by the template)", param.name);
                }
            }
        }
        out
    }
}

fn toml_string(s: &str) -> String {
    toml::Value::String(s.to_string()).to_string()
}

fn placeholder(ty: ParamType) -> &'static str {
    match ty {
        ParamType::String => "\"\"",
        ParamType::Int => "0",
        ParamType::Bool => "false",
        ParamType::Array => "[]",
    }
}

fn to_toml(value: &Value) -> Option<toml::Value> {
    match value {
        Value::String(s) => Some(toml::Value::String(s.clone())),
        Value::Int(i) => Some(toml::Value::Integer(*i)),
        Value::Bool(b) => Some(toml::Value::Boolean(*b)),
        Value::Array(items) => items
            .iter()
            .map(to_toml)
            .collect::<Option<Vec<_>>>()
            .map(toml::Value::Array),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_parameter_file() {
        let file: ParameterFile = r#"
[scope]
subscription = "11111111-1111-1111-1111-111111111111"
resource_group = "games"

[parameters]
containerGroupName = "Pixelmon-Server"
memoryInGB = 6
whitelist = ["alex", "steve"]
"#
        .parse()
        .unwrap();

        assert_eq!(file.scope.resource_group, "games");
        assert_eq!(file.scope.location, "eastus");
        assert_eq!(
            file.scope.resource_group_id(),
            "/subscriptions/11111111-1111-1111-1111-111111111111/resourceGroups/games"
        );
        let names: Vec<&str> = file.values.keys().map(String::as_str).collect();
        assert_eq!(names, ["containerGroupName", "memoryInGB", "whitelist"]);
        assert_eq!(file.values["memoryInGB"], Value::Int(6));
    }

    #[test]
    fn test_interpolation_not_compiled() {
        let file: ParameterFile = "[parameters]\nserverName = \"${oops}\"\n".parse().unwrap();
        assert_eq!(file.values["serverName"], Value::from("${oops}"));
    }

    #[test]
    fn test_float_rejected() {
        let err = "[parameters]\nmemoryInGB = 5.5\n"
            .parse::<ParameterFile>()
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "unsupported value '5.5' for parameter 'memoryInGB': float and datetime values are not supported"
        );
    }

    #[test]
    fn test_unknown_scope_key() {
        let err = "[scope]\nregion = \"westus\"\n"
            .parse::<ParameterFile>()
            .unwrap_err();
        assert!(matches!(*err, Error::Parse { .. }));
    }

    #[test]
    fn test_secret_env_var() {
        assert_eq!(
            secret_env_var("curseForgeApiKey"),
            "GAMEHOST_CURSE_FORGE_API_KEY"
        );
        assert_eq!(
            secret_env_var("dockerHubPersonalAccessToken"),
            "GAMEHOST_DOCKER_HUB_PERSONAL_ACCESS_TOKEN"
        );
    }

    #[test]
    fn test_skeleton() {
        let template: Template = r#"
[template]
name = "demo"
version = "1.0.0"

[parameters.location]
type = "string"
default = "${resourceGroup().location}"

[parameters.memoryInGB]
type = "int"
default = 6
description = "Memory"

[parameters.owner]
type = "string"

[parameters.apiKey]
type = "string"
secure = true
"#
        .parse()
        .unwrap();

        insta::assert_snapshot!(ParameterFile::skeleton(&template), @r#"
        # Parameters for the 'demo' template (1.0.0)

        [scope]
        # subscription = "00000000-0000-0000-0000-000000000000"
        # resource_group = "gamehost"
        # location = "eastus"

        [parameters]

        # location = (computed by the template)

        # Memory
        # memoryInGB = 6

        owner = ""

        # apiKey is secure: set GAMEHOST_API_KEY or pass --prompt-secrets
        "#);
    }

    #[test]
    fn test_skeleton_parses_back() {
        let file = crate::TemplateFile::builtin("pixelmon").unwrap();
        let skeleton = ParameterFile::skeleton(file.template());
        let parsed: ParameterFile = skeleton.parse().unwrap();
        assert_eq!(parsed.scope, Scope::default());
        assert!(parsed.values.is_empty());
    }
}
