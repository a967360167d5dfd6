//! Core type definitions.

use serde::{Deserialize, Serialize};

/// Declared type of a template parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ParamType {
    String,
    Int,
    Bool,
    /// Array of strings.
    Array,
}

impl ParamType {
    /// Get the type name as written in a template.
    pub fn as_str(&self) -> &'static str {
        match self {
            ParamType::String => "string",
            ParamType::Int => "int",
            ParamType::Bool => "bool",
            ParamType::Array => "array",
        }
    }

    /// Returns true if values of this type have a length (strings and arrays).
    pub fn has_length(&self) -> bool {
        matches!(self, ParamType::String | ParamType::Array)
    }
}

impl std::fmt::Display for ParamType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_param_type_as_str() {
        assert_eq!(ParamType::String.as_str(), "string");
        assert_eq!(ParamType::Int.as_str(), "int");
        assert_eq!(ParamType::Bool.as_str(), "bool");
        assert_eq!(ParamType::Array.as_str(), "array");
    }

    #[test]
    fn test_param_type_deserialize() {
        #[derive(Deserialize)]
        struct Holder {
            ty: ParamType,
        }
        let holder: Holder = toml::from_str(r#"ty = "int""#).unwrap();
        assert_eq!(holder.ty, ParamType::Int);
        assert!(toml::from_str::<Holder>(r#"ty = "float""#).is_err());
    }

    #[test]
    fn test_has_length() {
        assert!(ParamType::String.has_length());
        assert!(ParamType::Array.has_length());
        assert!(!ParamType::Int.has_length());
    }
}
