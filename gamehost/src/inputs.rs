//! Assembling a [`ParameterSet`] from the command line.
//!
//! Precedence is template defaults < parameter file < `-p` overrides. Secure
//! parameters only come from the environment or an interactive prompt.

use std::collections::HashMap;

use dialoguer::{Password, theme::ColorfulTheme};
use eyre::{Result, bail, eyre};
use gamehost_core::{ParamType, SecretString};
use gamehost_ir::Value;
use gamehost_resolve::{ParameterSet, Supplied};
use gamehost_template::{Parameter, ParameterFile, Template, secret_env_var};

use crate::commands::ParamArgs;

/// Where secret values are read from.
pub trait SecretSource {
    fn var(&self, name: &str) -> Option<String>;

    fn prompt(&mut self, param: &Parameter) -> Result<String>;
}

/// The process environment and a hidden terminal prompt.
pub struct Environment;

impl SecretSource for Environment {
    fn var(&self, name: &str) -> Option<String> {
        std::env::var(name).ok()
    }

    fn prompt(&mut self, param: &Parameter) -> Result<String> {
        let label = match &param.description {
            Some(description) => format!("{} ({})", param.name, description),
            None => param.name.clone(),
        };
        let value = Password::with_theme(&ColorfulTheme::default())
            .with_prompt(label)
            .interact()?;
        Ok(value)
    }
}

pub fn collect(
    template: &Template,
    args: &ParamArgs,
    file: Option<ParameterFile>,
    secrets: &mut dyn SecretSource,
) -> Result<ParameterSet> {
    let mut set = match file {
        Some(file) => ParameterSet::from_file(file),
        None => ParameterSet::new(),
    };

    for (name, raw) in &args.overrides {
        let value = match template.parameters.get(name) {
            Some(param) => parse_override(param, raw)?,
            // Undeclared names are reported by the resolver.
            None => Value::from(raw.as_str()),
        };
        set.insert(name.clone(), value);
    }

    for param in template.secure_parameters() {
        if matches!(set.get(&param.name), Some(Supplied::Plain(_))) {
            bail!(
                "secure parameter '{}' cannot be set in a parameter file or with -p; set {} or pass --prompt-secrets",
                param.name,
                secret_env_var(&param.name)
            );
        }
    }

    let mapped: HashMap<&str, &str> = args
        .secret_env
        .iter()
        .map(|(name, var)| (name.as_str(), var.as_str()))
        .collect();
    for name in mapped.keys() {
        if !template.parameters.get(*name).is_some_and(|p| p.secure) {
            bail!("--secret-env {}: '{}' is not a secure parameter", name, name);
        }
    }

    for param in template.secure_parameters() {
        let explicit = mapped.get(param.name.as_str()).copied();
        let var = explicit
            .map(str::to_string)
            .unwrap_or_else(|| secret_env_var(&param.name));

        let value = match secrets.var(&var) {
            Some(value) => value,
            None if explicit.is_some() => {
                bail!("environment variable {} for '{}' is not set", var, param.name)
            }
            None if args.prompt_secrets => secrets.prompt(param)?,
            None if param.is_required() => bail!(
                "secure parameter '{}' is required; set {} or pass --prompt-secrets",
                param.name,
                var
            ),
            None => continue,
        };
        tracing::debug!(parameter = %param.name, "secure parameter supplied");
        set.insert_secure(param.name.clone(), SecretString::new(value));
    }

    Ok(set)
}

/// Parse a `-p` value according to the parameter's declared type.
fn parse_override(param: &Parameter, raw: &str) -> Result<Value> {
    let invalid = || eyre!("invalid value '{}' for {} parameter '{}'", raw, param.ty, param.name);
    match param.ty {
        ParamType::String => Ok(Value::from(raw)),
        ParamType::Int => raw.trim().parse().map(Value::Int).map_err(|_| invalid()),
        ParamType::Bool => match raw.trim() {
            "true" => Ok(Value::Bool(true)),
            "false" => Ok(Value::Bool(false)),
            _ => Err(invalid()),
        },
        ParamType::Array if raw.trim().is_empty() => Ok(Value::Array(Vec::new())),
        ParamType::Array => Ok(Value::Array(
            raw.split(',').map(|item| Value::from(item.trim())).collect(),
        )),
    }
}
