//! Bind phase - checks supplied parameter values against their declarations.

use std::collections::HashMap;

use gamehost_ir::{SecureValue, Value};

use crate::{
    ResolveError, Result, Supplied,
    pipeline::{Phase, ResolveContext},
};

/// Phase that checks every supplied value and hands them to the evaluator.
///
/// Defaults are not evaluated here; they are computed on first use.
pub struct BindPhase;

impl Phase for BindPhase {
    fn name(&self) -> &'static str {
        "bind"
    }

    fn description(&self) -> &'static str {
        "Check supplied parameters for type, constraints and secure handling"
    }

    fn run(&self, ctx: &mut ResolveContext<'_>) -> Result<()> {
        let template = ctx.template;
        let mut bound = HashMap::with_capacity(ctx.parameters.len());

        for (name, supplied) in ctx.parameters.iter() {
            let Some(param) = template.parameters.get(name) else {
                return Err(ResolveError::UnknownParameter { name: name.clone() });
            };

            let value = match (supplied, param.secure) {
                (Supplied::Secure(secret), true) => {
                    tracing::debug!(parameter = %name, "bound secure parameter");
                    Value::Secure(SecureValue::new(name.clone(), secret.clone()))
                }
                (Supplied::Plain(_), true) => {
                    return Err(ResolveError::InsecureSecret { name: name.clone() });
                }
                (Supplied::Secure(_), false) => {
                    return Err(ResolveError::type_mismatch(
                        &format!("parameters.{}", name),
                        format!("'{}' is not a secure parameter", name),
                    ));
                }
                (Supplied::Plain(value), false) => {
                    tracing::debug!(parameter = %name, value = %value, "bound parameter");
                    value.clone()
                }
            };

            if matches!(value, Value::Runtime(_)) || !value.conforms_to(param.ty) {
                return Err(ResolveError::type_mismatch(
                    &format!("parameters.{}", name),
                    format!("expected {}, found {}", param.ty, value.type_name()),
                ));
            }
            if let Some(message) = param.constraints.check(&value) {
                return Err(ResolveError::ConstraintViolation {
                    name: name.clone(),
                    message,
                });
            }

            bound.insert(name.clone(), value);
        }

        if let Some(missing) = template
            .required_parameters()
            .find(|p| !bound.contains_key(&p.name))
        {
            return Err(ResolveError::MissingRequiredParameter {
                name: missing.name.clone(),
            });
        }

        ctx.evaluator.bind(bound);
        Ok(())
    }
}
