//! Parameter values supplied for one resolution.

use gamehost_core::SecretString;
use gamehost_ir::Value;
use gamehost_template::{ParameterFile, Scope};
use indexmap::IndexMap;

/// A supplied parameter value.
#[derive(Debug, Clone, PartialEq)]
pub enum Supplied {
    Plain(Value),
    /// Supplied through a secure channel; never printed.
    Secure(SecretString),
}

/// The parameter values and deployment scope for one resolution.
///
/// Later inserts replace earlier ones, so applying defaults, then a file,
/// then overrides gives the documented precedence.
#[derive(Debug, Clone, Default)]
pub struct ParameterSet {
    values: IndexMap<String, Supplied>,
    scope: Scope,
}

impl ParameterSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from a parameter file's scope and values.
    pub fn from_file(file: ParameterFile) -> Self {
        let mut set = Self::new().with_scope(file.scope);
        for (name, value) in file.values {
            set.insert(name, value);
        }
        set
    }

    pub fn with_scope(mut self, scope: Scope) -> Self {
        self.scope = scope;
        self
    }

    pub fn scope(&self) -> &Scope {
        &self.scope
    }

    pub fn set_scope(&mut self, scope: Scope) {
        self.scope = scope;
    }

    /// Insert a plain value.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) -> &mut Self {
        self.values.insert(name.into(), Supplied::Plain(value.into()));
        self
    }

    /// Insert a value for a secure parameter.
    pub fn insert_secure(&mut self, name: impl Into<String>, value: SecretString) -> &mut Self {
        self.values.insert(name.into(), Supplied::Secure(value));
        self
    }

    pub fn get(&self, name: &str) -> Option<&Supplied> {
        self.values.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Supplied)> {
        self.values.iter()
    }
}
