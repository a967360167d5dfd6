//! Template parsing, expression language and parameter files for gamehost.
//!
//! A template is a TOML document declaring parameters, derived values
//! (`[variables]`), resources and outputs. String values may embed
//! `${...}` expressions, which are compiled here and evaluated by
//! `gamehost-resolve`.

// Miette's derive macro generates code that triggers these warnings
#![allow(unused_assignments)]

pub mod builtin;
mod error;
pub mod expr;
mod params;
mod template;

pub use error::{Error, Result, SourceContext};
pub use params::{ParameterFile, SECRET_ENV_PREFIX, Scope, secret_env_var};
pub use template::{
    Constraints, Output, Parameter, ParseContext, RESERVED_NAMES, Resource, Template,
    TemplateFile, Variable, parse_template,
};
