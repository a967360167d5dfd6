//! Pipeline phase trait.

use super::ResolveContext;
use crate::Result;

/// Name and description of a pipeline phase, shown by `gamehost explain`.
#[derive(Debug, Clone)]
pub struct PhaseInfo {
    pub name: &'static str,
    pub description: &'static str,
}

/// A step of the resolution pipeline.
///
/// Phases run in order and each reads what the previous ones left in the
/// [`ResolveContext`]. A phase fails by returning an error; lint findings
/// that do not stop resolution are recorded as diagnostics instead.
pub trait Phase: Send + Sync {
    fn name(&self) -> &'static str;

    fn description(&self) -> &'static str;

    fn run(&self, ctx: &mut ResolveContext<'_>) -> Result<()>;

    fn info(&self) -> PhaseInfo {
        PhaseInfo {
            name: self.name(),
            description: self.description(),
        }
    }
}
