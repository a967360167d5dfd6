//! Built-in pipeline phases.
//!
//! - [`ValidatePhase`] - runs lints over the template
//! - [`BindPhase`] - checks supplied parameters
//! - [`EvaluatePhase`] - decides conditions and expands `for_each`
//! - [`ExpandPhase`] - renders included instances into nodes
//! - [`LinkPhase`] - builds dependency edges and the graph
//! - [`OutputsPhase`] - evaluates outputs

mod bind;
mod evaluate;
mod expand;
mod link;
mod outputs;
mod validate;

pub use bind::BindPhase;
pub use evaluate::EvaluatePhase;
pub use expand::ExpandPhase;
pub use link::LinkPhase;
pub use outputs::OutputsPhase;
pub use validate::{
    DuplicateSymbolLint, Lint, LintInfo, MissingDescriptionLint, UndeclaredReferenceLint,
    UnknownDependencyLint, UnusedParameterLint, ValidatePhase,
};
