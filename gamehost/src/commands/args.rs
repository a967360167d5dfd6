//! Arguments shared by several commands.

use std::path::PathBuf;

use clap::Args;
use gamehost_template::{ParameterFile, TemplateFile};

use super::UnwrapOrExit;

// Which template to work on.
#[derive(Args, Debug)]
pub struct TemplateArgs {
    /// Path to the template (defaults to ./gamehost.toml)
    #[arg(short, long, default_value = "gamehost.toml")]
    pub template: PathBuf,

    /// Use a built-in template instead of a file (see `gamehost list`)
    #[arg(short, long, conflicts_with = "template")]
    pub builtin: Option<String>,
}

impl TemplateArgs {
    pub fn load(&self) -> gamehost_template::Result<TemplateFile> {
        match &self.builtin {
            Some(name) => TemplateFile::builtin(name),
            None => TemplateFile::open(&self.template),
        }
    }
}

// Where parameter values come from.
#[derive(Args, Debug, Default)]
pub struct ParamArgs {
    /// Parameter file with optional [scope] and [parameters] tables
    #[arg(long, value_name = "FILE")]
    pub params: Option<PathBuf>,

    /// Override a parameter, e.g. `-p memoryInGB=6`; arrays are comma separated
    #[arg(short = 'p', long = "param", value_name = "NAME=VALUE", value_parser = parse_assignment)]
    pub overrides: Vec<(String, String)>,

    /// Read a secure parameter from the given environment variable
    #[arg(long, value_name = "NAME=VAR", value_parser = parse_assignment)]
    pub secret_env: Vec<(String, String)>,

    /// Prompt for secure parameters that are not set in the environment
    #[arg(long)]
    pub prompt_secrets: bool,
}

impl ParamArgs {
    /// Whether any parameter source was given on the command line.
    pub fn is_given(&self) -> bool {
        self.params.is_some()
            || !self.overrides.is_empty()
            || !self.secret_env.is_empty()
            || self.prompt_secrets
    }

    pub fn load_file(&self) -> Option<ParameterFile> {
        self.params
            .as_ref()
            .map(|path| ParameterFile::open(path).unwrap_or_exit())
    }
}

fn parse_assignment(s: &str) -> Result<(String, String), String> {
    let (name, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected NAME=VALUE, found '{}'", s))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(format!("missing name in '{}'", s));
    }
    Ok((name.to_string(), value.to_string()))
}
