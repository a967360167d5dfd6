//! Link phase - builds dependency edges and the resource graph.

use std::collections::HashMap;

use gamehost_ir::{DependencyEdge, EdgeKind};

use crate::{
    ResolveError, Result,
    pipeline::{Phase, ResolveContext},
};

/// Phase that attaches dependency edges to every node.
///
/// Edges come in order: parent, explicit `depends_on`, then the resources
/// the node's expressions read. Explicit dependencies on excluded resources
/// are dropped; a dependency on a `for_each` resource targets every
/// included instance.
pub struct LinkPhase;

fn push_edge(edges: &mut Vec<DependencyEdge>, target: String, kind: EdgeKind) {
    let edge = DependencyEdge::new(target, kind);
    if !edges.contains(&edge) {
        edges.push(edge);
    }
}

impl Phase for LinkPhase {
    fn name(&self) -> &'static str {
        "link"
    }

    fn description(&self) -> &'static str {
        "Build dependency edges and check resource names are unique"
    }

    fn run(&self, ctx: &mut ResolveContext<'_>) -> Result<()> {
        let template = ctx.template;
        let mut nodes = std::mem::take(&mut ctx.nodes);
        let mut names: HashMap<(String, String), String> = HashMap::new();

        for node in &mut nodes {
            let key = (
                node.resource_type.to_ascii_lowercase(),
                node.name.to_lowercase(),
            );
            if let Some(first) = names.get(&key) {
                return Err(ResolveError::DuplicateResourceName {
                    resource_type: node.resource_type.clone(),
                    name: node.name.clone(),
                    first: first.clone(),
                    second: node.id.clone(),
                });
            }
            names.insert(key, node.id.clone());

            let resource = &template.resources[&node.symbol];
            let mut edges = Vec::new();

            if let Some(parent) = &resource.parent {
                push_edge(&mut edges, parent.clone(), EdgeKind::Parent);
            }

            for dependency in &resource.depends_on {
                let targets = ctx.evaluator.instances(dependency)?;
                let mut linked = false;
                for target in targets.iter().filter(|t| t.included) {
                    push_edge(&mut edges, target.id(), EdgeKind::Explicit);
                    linked = true;
                }
                if !linked {
                    tracing::debug!(
                        resource = %node.id,
                        dependency = %dependency,
                        "dropped dependency on excluded resource"
                    );
                }
            }

            if let Some(instance) = ctx.instances.iter().find(|i| i.id() == node.id) {
                for target in ctx.evaluator.references_of(instance) {
                    push_edge(&mut edges, target, EdgeKind::Reference);
                }
            }

            node.depends_on = edges;
        }

        ctx.graph.resources = nodes;
        ctx.graph.excluded = ctx
            .instances
            .iter()
            .filter(|i| !i.included)
            .map(|i| i.id())
            .collect();
        Ok(())
    }
}
