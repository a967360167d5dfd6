//! Evaluate phase - decides conditions, expands `for_each` declarations and
//! computes every derived value.

use crate::{
    Result,
    pipeline::{Phase, ResolveContext},
};

/// Phase that turns every resource declaration into its instances.
pub struct EvaluatePhase;

impl Phase for EvaluatePhase {
    fn name(&self) -> &'static str {
        "evaluate"
    }

    fn description(&self) -> &'static str {
        "Evaluate conditions and derived values, expand for_each resources into instances"
    }

    fn run(&self, ctx: &mut ResolveContext<'_>) -> Result<()> {
        for symbol in ctx.template.resources.keys() {
            let instances = ctx.evaluator.instances(symbol)?;
            for instance in &instances {
                if !instance.included {
                    tracing::debug!(resource = %instance.id(), "excluded by condition");
                }
            }
            ctx.instances.extend(instances);
        }

        // Unused derived values must still be valid.
        for name in ctx.template.variables.keys() {
            ctx.evaluator.variable(name)?;
        }
        Ok(())
    }
}
