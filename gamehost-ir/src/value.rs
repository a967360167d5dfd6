//! Values produced by expression evaluation.

use std::fmt;

use gamehost_core::{ParamType, SecretString};
use indexmap::IndexMap;
use serde::{Serialize, Serializer};

/// A fully evaluated value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    String(String),
    Array(Vec<Value>),
    Object(IndexMap<String, Value>),
    /// A string derived from one or more secure parameters.
    Secure(SecureValue),
    /// A property only the deployment platform can supply.
    Runtime(RuntimeRef),
}

/// A secret string together with the secure parameters it was derived from.
#[derive(Debug, Clone, PartialEq)]
pub struct SecureValue {
    sources: Vec<String>,
    value: SecretString,
}

impl SecureValue {
    pub fn new(source: impl Into<String>, value: SecretString) -> Self {
        Self {
            sources: vec![source.into()],
            value,
        }
    }

    /// Combine several sources into one secret (used by concatenation).
    pub fn derived(sources: Vec<String>, value: String) -> Self {
        let mut unique = Vec::with_capacity(sources.len());
        for source in sources {
            if !unique.contains(&source) {
                unique.push(source);
            }
        }
        Self {
            sources: unique,
            value: SecretString::new(value),
        }
    }

    /// Names of the secure parameters this value came from.
    pub fn sources(&self) -> &[String] {
        &self.sources
    }

    pub fn secret(&self) -> &SecretString {
        &self.value
    }

    /// The marker written in place of the value in serialized output.
    pub fn marker(&self) -> String {
        let quoted: Vec<String> = self.sources.iter().map(|s| format!("'{}'", s)).collect();
        format!("[secure({})]", quoted.join(", "))
    }
}

/// A reference to a property resolved by the deployment platform,
/// e.g. `reference('pixelmon').ipAddress.ip`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeRef {
    expression: String,
}

impl RuntimeRef {
    pub fn new(expression: impl Into<String>) -> Self {
        Self {
            expression: expression.into(),
        }
    }

    pub fn expression(&self) -> &str {
        &self.expression
    }

    /// Extend the reference with a property access.
    pub fn member(&self, field: &str) -> Self {
        Self::new(format!("{}.{}", self.expression, field))
    }

    /// Extend the reference with an index access.
    pub fn index(&self, index: i64) -> Self {
        Self::new(format!("{}[{}]", self.expression, index))
    }
}

impl fmt::Display for RuntimeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]", self.expression)
    }
}

impl Value {
    /// Type name used in error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::String(_) => "string",
            Value::Array(_) => "array",
            Value::Object(_) => "object",
            Value::Secure(_) => "secure string",
            Value::Runtime(_) => "runtime reference",
        }
    }

    /// Check if the value can stand for a declared type.
    ///
    /// Secure values count as strings and arrays must hold strings. Runtime
    /// references are only known after deployment, so they conform to any type.
    pub fn conforms_to(&self, ty: ParamType) -> bool {
        match (self, ty) {
            (Value::Runtime(_), _) => true,
            (Value::String(_) | Value::Secure(_), ParamType::String) => true,
            (Value::Int(_), ParamType::Int) => true,
            (Value::Bool(_), ParamType::Bool) => true,
            (Value::Array(items), ParamType::Array) => items
                .iter()
                .all(|item| item.conforms_to(ParamType::String)),
            _ => false,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Value::Array(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&IndexMap<String, Value>> {
        match self {
            Value::Object(map) => Some(map),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Returns true if this value or anything nested in it is secure.
    pub fn contains_secure(&self) -> bool {
        match self {
            Value::Secure(_) => true,
            Value::Array(items) => items.iter().any(Value::contains_secure),
            Value::Object(map) => map.values().any(Value::contains_secure),
            _ => false,
        }
    }

    /// Text used when the value is embedded in an interpolated string.
    ///
    /// Returns `None` for values that have no plain-text form.
    pub fn to_interpolated(&self) -> Option<String> {
        match self {
            Value::String(s) => Some(s.clone()),
            Value::Int(i) => Some(i.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            _ => None,
        }
    }

    /// Remove `null` entries from objects, recursively.
    ///
    /// Null properties are how a conditional branch says "leave this out".
    pub fn prune_nulls(self) -> Value {
        match self {
            Value::Object(map) => Value::Object(
                map.into_iter()
                    .filter(|(_, v)| !v.is_null())
                    .map(|(k, v)| (k, v.prune_nulls()))
                    .collect(),
            ),
            Value::Array(items) => {
                Value::Array(items.into_iter().map(Value::prune_nulls).collect())
            }
            other => other,
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Value::Array(items.into_iter().map(Into::into).collect())
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(i) => write!(f, "{}", i),
            Value::String(s) => write!(f, "'{}'", s),
            Value::Array(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, "]")
            }
            Value::Object(map) => {
                write!(f, "{{")?;
                for (i, (key, value)) in map.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}: {}", key, value)?;
                }
                write!(f, "}}")
            }
            Value::Secure(secure) => write!(f, "{}", secure.marker()),
            Value::Runtime(reference) => write!(f, "{}", reference),
        }
    }
}

impl Serialize for Value {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Value::Null => serializer.serialize_unit(),
            Value::Bool(b) => serializer.serialize_bool(*b),
            Value::Int(i) => serializer.serialize_i64(*i),
            Value::String(s) => serializer.serialize_str(s),
            Value::Array(items) => items.serialize(serializer),
            Value::Object(map) => map.serialize(serializer),
            Value::Secure(secure) => serializer.serialize_str(&secure.marker()),
            Value::Runtime(reference) => serializer.collect_str(reference),
        }
    }
}
