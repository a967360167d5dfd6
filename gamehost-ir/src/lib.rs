//! Resolved representation types for the gamehost template resolver.
//!
//! This crate holds the output side of resolution: the values an expression
//! evaluates to and the resource graph built from them.
//!
//! # Architecture
//!
//! ```text
//! template.toml → gamehost-template (parsing) → gamehost-resolve (pipeline) → gamehost-ir
//! ```
//!
//! Everything here is immutable once built and serializes deterministically.
//! Secure values serialize as a `[secure('<parameter>')]` marker, never as
//! their plain text.

mod graph;
mod output;
mod serde_helpers;
mod value;

pub use graph::{DependencyEdge, EdgeKind, ResourceGraph, ResourceNode, TemplateMeta};
pub use output::{OutputSet, OutputValue, Resolution};
pub use value::{RuntimeRef, SecureValue, Value};
