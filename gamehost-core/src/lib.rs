//! Core utilities and types for the gamehost template resolver.
//!
//! This crate provides fundamental types and utilities used across
//! the gamehost crates.

mod secret;
mod types;
mod utils;
mod version;

pub use secret::{Secret, SecretString};
// Fundamental types
pub use types::ParamType;
// String utilities
pub use utils::{to_screaming_snake_case, to_snake_case, toml_value_to_string};
pub use version::Version;
