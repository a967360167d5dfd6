//! Resolution pipeline.
//!
//! A [`Pipeline`] runs a fixed sequence of phases over a [`ResolveContext`]:
//!
//! - validate: static lints over the template, before anything is bound
//! - bind: check supplied parameters against their declarations
//! - evaluate: decide conditions and expand `for_each` declarations
//! - expand: render names and bodies of the included instances
//! - link: build dependency edges and the resource graph
//! - outputs: evaluate the named outputs
//!
//! Each phase runs inside a `tracing` span named after it.
//!
//! # Example
//!
//! ```ignore
//! use gamehost_resolve::{ParameterSet, pipeline::Pipeline};
//!
//! let ctx = Pipeline::new().run(&template, &ParameterSet::new())?;
//! for diag in ctx.warnings() {
//!     eprintln!("{}", diag);
//! }
//! ```

mod context;
mod diagnostic;
mod phase;
pub mod phases;
mod runner;

pub use context::ResolveContext;
pub use diagnostic::{Diagnostic, Severity};
pub use phase::{Phase, PhaseInfo};
pub use runner::Pipeline;
