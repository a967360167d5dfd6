use miette::Diagnostic;
use thiserror::Error;

use crate::pipeline::Diagnostic as LintDiagnostic;

pub type Result<T> = std::result::Result<T, ResolveError>;

/// Why resolution failed. Resolution never returns a partial graph.
#[derive(Debug, Error, Diagnostic)]
pub enum ResolveError {
    #[error("missing required parameter '{name}'")]
    #[diagnostic(
        code(gamehost::missing_required_parameter),
        help("pass it with -p {name}=<value> or add it to the parameter file")
    )]
    MissingRequiredParameter { name: String },

    #[error("type mismatch in '{location}': {message}")]
    #[diagnostic(code(gamehost::type_mismatch))]
    TypeMismatch { location: String, message: String },

    #[error("'{location}' reads '{target}', which is excluded by its condition")]
    #[diagnostic(
        code(gamehost::dangling_reference),
        help("guard the read with the same condition, e.g. `cond ? {target}.id : null`")
    )]
    DanglingReference { location: String, target: String },

    #[error("resources '{first}' and '{second}' both resolve to {resource_type} '{name}'")]
    #[diagnostic(code(gamehost::duplicate_resource_name))]
    DuplicateResourceName {
        resource_type: String,
        name: String,
        first: String,
        second: String,
    },

    #[error("index {index} is out of range in '{location}' (length {len})")]
    #[diagnostic(code(gamehost::invalid_array_index))]
    InvalidArrayIndex {
        location: String,
        index: i64,
        len: usize,
    },

    #[error("unknown parameter '{name}'")]
    #[diagnostic(
        code(gamehost::unknown_parameter),
        help("run 'gamehost explain' to list the template's parameters")
    )]
    UnknownParameter { name: String },

    #[error("secure parameter '{name}' was supplied as a plain value")]
    #[diagnostic(
        code(gamehost::insecure_secret),
        help("supply secure parameters through the environment or an interactive prompt")
    )]
    InsecureSecret { name: String },

    #[error("parameter '{name}' {message}")]
    #[diagnostic(code(gamehost::constraint_violation))]
    ConstraintViolation { name: String, message: String },

    #[error("'{location}' references undeclared name '{name}'")]
    #[diagnostic(code(gamehost::undeclared_reference))]
    UndeclaredReference { location: String, name: String },

    #[error("cyclic reference: {cycle}")]
    #[diagnostic(code(gamehost::cyclic_reference))]
    CyclicReference { cycle: String },

    #[error("invalid expression in '{location}': {message}")]
    #[diagnostic(code(gamehost::invalid_expression))]
    InvalidExpression { location: String, message: String },

    #[error("output '{name}' would expose a secure value")]
    #[diagnostic(
        code(gamehost::secure_output),
        help("outputs are written in plain text; remove the secure parameter from the value")
    )]
    SecureOutput { name: String },

    #[error("template validation failed with {count} error(s)")]
    #[diagnostic(code(gamehost::invalid_template))]
    InvalidTemplate {
        count: usize,
        diagnostics: Vec<LintDiagnostic>,
    },
}

impl ResolveError {
    pub(crate) fn type_mismatch(location: &str, message: impl Into<String>) -> Self {
        Self::TypeMismatch {
            location: location.to_string(),
            message: message.into(),
        }
    }

    pub(crate) fn invalid_expression(location: &str, message: impl Into<String>) -> Self {
        Self::InvalidExpression {
            location: location.to_string(),
            message: message.into(),
        }
    }

    /// Short machine-friendly name of the error kind.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::MissingRequiredParameter { .. } => "MissingRequiredParameter",
            Self::TypeMismatch { .. } => "TypeMismatch",
            Self::DanglingReference { .. } => "DanglingReference",
            Self::DuplicateResourceName { .. } => "DuplicateResourceName",
            Self::InvalidArrayIndex { .. } => "InvalidArrayIndex",
            Self::UnknownParameter { .. } => "UnknownParameter",
            Self::InsecureSecret { .. } => "InsecureSecret",
            Self::ConstraintViolation { .. } => "ConstraintViolation",
            Self::UndeclaredReference { .. } => "UndeclaredReference",
            Self::CyclicReference { .. } => "CyclicReference",
            Self::InvalidExpression { .. } => "InvalidExpression",
            Self::SecureOutput { .. } => "SecureOutput",
            Self::InvalidTemplate { .. } => "InvalidTemplate",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        let err = ResolveError::DanglingReference {
            location: "outputs.workspaceId".into(),
            target: "logAnalytics".into(),
        };
        assert_eq!(
            err.to_string(),
            "'outputs.workspaceId' reads 'logAnalytics', which is excluded by its condition"
        );
        assert_eq!(err.kind(), "DanglingReference");

        let err = ResolveError::ConstraintViolation {
            name: "cpuCores".into(),
            message: "must be at most 4, found 8".into(),
        };
        assert_eq!(
            err.to_string(),
            "parameter 'cpuCores' must be at most 4, found 8"
        );
    }
}
