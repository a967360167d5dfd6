//! Template types and parsing for template TOML files.

mod file;
mod parse;
mod validate;

pub use file::TemplateFile;
use gamehost_core::ParamType;
use gamehost_ir::{TemplateMeta, Value};
use indexmap::IndexMap;
pub use parse::parse_template;
pub use validate::{ParseContext, RESERVED_NAMES};

use crate::expr::TemplateValue;

/// A parsed and statically checked template.
///
/// Table order from the source file is preserved in every map.
#[derive(Debug, Clone)]
pub struct Template {
    pub meta: TemplateMeta,
    pub parameters: IndexMap<String, Parameter>,
    pub variables: IndexMap<String, Variable>,
    pub resources: IndexMap<String, Resource>,
    pub outputs: IndexMap<String, Output>,
}

impl Template {
    /// Parameters that must be supplied because they have no default.
    pub fn required_parameters(&self) -> impl Iterator<Item = &Parameter> {
        self.parameters.values().filter(|p| p.is_required())
    }

    /// Secure parameters, in declaration order.
    pub fn secure_parameters(&self) -> impl Iterator<Item = &Parameter> {
        self.parameters.values().filter(|p| p.secure)
    }

    /// Check if a symbol is declared in any namespace.
    pub fn declares(&self, name: &str) -> bool {
        self.parameters.contains_key(name)
            || self.variables.contains_key(name)
            || self.resources.contains_key(name)
    }
}

#[derive(Debug, Clone)]
pub struct Parameter {
    pub name: String,
    pub ty: ParamType,
    pub default: Option<TemplateValue>,
    /// Secure values are never echoed, logged or serialized.
    pub secure: bool,
    pub description: Option<String>,
    pub constraints: Constraints,
}

impl Parameter {
    pub fn is_required(&self) -> bool {
        self.default.is_none()
    }
}

/// Limits a bound parameter value must satisfy.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Constraints {
    pub min: Option<i64>,
    pub max: Option<i64>,
    pub min_length: Option<usize>,
    pub max_length: Option<usize>,
    pub allowed: Option<Vec<Value>>,
}

impl Constraints {
    pub fn is_empty(&self) -> bool {
        self == &Constraints::default()
    }

    /// Check a value against the constraints, returning a description of the
    /// first violation.
    pub fn check(&self, value: &Value) -> Option<String> {
        if let Some(allowed) = &self.allowed
            && !is_allowed(allowed, value)
        {
            let list = allowed
                .iter()
                .map(|v| v.to_string())
                .collect::<Vec<_>>()
                .join(", ");
            return Some(format!("must be one of [{}]", list));
        }

        if let Some(n) = value.as_int() {
            if let Some(min) = self.min
                && n < min
            {
                return Some(format!("must be at least {}, found {}", min, n));
            }
            if let Some(max) = self.max
                && n > max
            {
                return Some(format!("must be at most {}, found {}", max, n));
            }
        }

        let length = match value {
            Value::String(s) => Some(s.chars().count()),
            Value::Array(items) => Some(items.len()),
            Value::Secure(secure) => Some(secure.secret().expose().chars().count()),
            _ => None,
        };
        if let Some(len) = length {
            if let Some(min) = self.min_length
                && len < min
            {
                return Some(format!("length must be at least {}, found {}", min, len));
            }
            if let Some(max) = self.max_length
                && len > max
            {
                return Some(format!("length must be at most {}, found {}", max, len));
            }
        }

        None
    }
}

/// Secure values match on their text without leaving the secret in the
/// message.
fn is_allowed(allowed: &[Value], value: &Value) -> bool {
    match value {
        Value::Secure(secure) => {
            let text = secure.secret().expose();
            allowed.iter().any(|v| v.as_str() == Some(text.as_str()))
        }
        _ => allowed.contains(value),
    }
}

/// A named derived value.
#[derive(Debug, Clone)]
pub struct Variable {
    pub name: String,
    pub value: TemplateValue,
}

/// A resource declaration before condition and for-each are applied.
#[derive(Debug, Clone)]
pub struct Resource {
    pub symbol: String,
    pub resource_type: String,
    pub api_version: String,
    pub name: TemplateValue,
    pub condition: Option<TemplateValue>,
    pub for_each: Option<TemplateValue>,
    pub parent: Option<String>,
    pub depends_on: Vec<String>,
    pub description: Option<String>,
    /// Free-form fields such as `location`, `sku` and `properties`.
    pub body: IndexMap<String, TemplateValue>,
}

impl Resource {
    pub fn is_conditional(&self) -> bool {
        self.condition.is_some()
    }

    pub fn is_loop(&self) -> bool {
        self.for_each.is_some()
    }

    /// Root names read by the resource's expressions, in first-use order.
    pub fn references(&self) -> Vec<String> {
        let mut out = Vec::new();
        if let Some(condition) = &self.condition {
            condition.collect_references(&mut out);
        }
        if let Some(for_each) = &self.for_each {
            for_each.collect_references(&mut out);
        }
        self.name.collect_references(&mut out);
        for value in self.body.values() {
            value.collect_references(&mut out);
        }
        out
    }
}

#[derive(Debug, Clone)]
pub struct Output {
    pub name: String,
    pub ty: ParamType,
    pub value: TemplateValue,
    pub condition: Option<TemplateValue>,
    pub description: Option<String>,
}

#[cfg(test)]
mod tests {
    use gamehost_core::SecretString;
    use gamehost_ir::SecureValue;

    use super::*;

    fn secure(text: &str) -> Value {
        Value::Secure(SecureValue::new("apiKey", SecretString::new(text.to_string())))
    }

    #[test]
    fn test_constraints_range() {
        let constraints = Constraints {
            min: Some(2),
            max: Some(4),
            ..Default::default()
        };
        assert_eq!(constraints.check(&Value::Int(3)), None);
        assert_eq!(
            constraints.check(&Value::Int(8)).as_deref(),
            Some("must be at most 4, found 8")
        );
        assert_eq!(
            constraints.check(&Value::Int(1)).as_deref(),
            Some("must be at least 2, found 1")
        );
    }

    #[test]
    fn test_constraints_length() {
        let constraints = Constraints {
            min_length: Some(3),
            max_length: Some(24),
            ..Default::default()
        };
        assert_eq!(constraints.check(&Value::from("mcstorage")), None);
        assert_eq!(
            constraints.check(&Value::from("ab")).as_deref(),
            Some("length must be at least 3, found 2")
        );
        assert_eq!(
            constraints.check(&Value::from(vec!["a"; 30])).as_deref(),
            Some("length must be at most 24, found 30")
        );
    }

    #[test]
    fn test_constraints_allowed() {
        let constraints = Constraints {
            allowed: Some(vec![Value::from("Regular"), Value::from("Spot")]),
            ..Default::default()
        };
        assert!(constraints.check(&Value::from("Spot")).is_none());
        assert_eq!(
            constraints.check(&Value::from("Low")).as_deref(),
            Some("must be one of ['Regular', 'Spot']")
        );
        assert!(!constraints.is_empty());
        assert!(Constraints::default().is_empty());
    }

    #[test]
    fn test_constraints_on_secure_values() {
        let constraints = Constraints {
            min_length: Some(8),
            ..Default::default()
        };
        assert_eq!(
            constraints.check(&secure("abc")).as_deref(),
            Some("length must be at least 8, found 3")
        );
        assert!(constraints.check(&secure("long-enough")).is_none());

        let constraints = Constraints {
            allowed: Some(vec![Value::from("alpha"), Value::from("beta")]),
            ..Default::default()
        };
        assert!(constraints.check(&secure("beta")).is_none());
        let message = constraints.check(&secure("gamma")).unwrap();
        assert_eq!(message, "must be one of ['alpha', 'beta']");
    }
}
