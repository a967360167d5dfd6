//! Expand phase - renders included instances into resource nodes.

use gamehost_ir::ResourceNode;
use indexmap::IndexMap;

use crate::{
    Result,
    pipeline::{Phase, ResolveContext},
};

/// Phase that evaluates the name and body of every included instance.
///
/// Null fields are dropped, at any depth.
pub struct ExpandPhase;

impl Phase for ExpandPhase {
    fn name(&self) -> &'static str {
        "expand"
    }

    fn description(&self) -> &'static str {
        "Render names and bodies of included resources"
    }

    fn run(&self, ctx: &mut ResolveContext<'_>) -> Result<()> {
        let template = ctx.template;

        for instance in ctx.instances.iter().filter(|i| i.included) {
            let resource = &template.resources[&instance.symbol];
            let name = ctx.evaluator.full_name(instance)?;

            let mut body = IndexMap::with_capacity(resource.body.len());
            for key in resource.body.keys() {
                let value = ctx.evaluator.field(instance, key)?.prune_nulls();
                if !value.is_null() {
                    body.insert(key.clone(), value);
                }
            }

            tracing::debug!(resource = %instance.id(), name = %name, "expanded");
            ctx.nodes.push(ResourceNode {
                id: instance.id(),
                symbol: instance.symbol.clone(),
                index: instance.index,
                resource_type: resource.resource_type.clone(),
                api_version: resource.api_version.clone(),
                name,
                body,
                depends_on: Vec::new(),
            });
        }
        Ok(())
    }
}
