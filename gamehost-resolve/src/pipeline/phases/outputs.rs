//! Outputs phase - evaluates the named outputs.

use gamehost_ir::OutputValue;

use crate::{
    ResolveError, Result,
    eval::Local,
    pipeline::{Phase, ResolveContext},
};

/// Phase that evaluates outputs in declaration order.
///
/// An output whose condition is false is left out. Outputs are plain text,
/// so a value derived from a secure parameter is an error.
pub struct OutputsPhase;

impl Phase for OutputsPhase {
    fn name(&self) -> &'static str {
        "outputs"
    }

    fn description(&self) -> &'static str {
        "Evaluate named outputs and check their declared types"
    }

    fn run(&self, ctx: &mut ResolveContext<'_>) -> Result<()> {
        let template = ctx.template;

        for (name, output) in &template.outputs {
            let location = format!("outputs.{}", name);

            let condition = Local::global(format!("{}.condition", location));
            if !ctx
                .evaluator
                .eval_condition(output.condition.as_ref(), &condition)?
            {
                tracing::debug!(output = %name, "excluded by condition");
                continue;
            }

            let value = ctx
                .evaluator
                .eval_value(&output.value, &Local::global(location.as_str()))?;
            if value.contains_secure() {
                return Err(ResolveError::SecureOutput { name: name.clone() });
            }
            if !value.conforms_to(output.ty) {
                return Err(ResolveError::type_mismatch(
                    &location,
                    format!(
                        "output '{}' is declared {} but its value is {}",
                        name,
                        output.ty,
                        value.type_name()
                    ),
                ));
            }

            ctx.outputs.insert(name.clone(), OutputValue { ty: output.ty, value });
        }
        Ok(())
    }
}
