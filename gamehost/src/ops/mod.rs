//! Core operations.
//!
//! This module contains the business logic for gamehost commands,
//! separated from CLI argument parsing and output rendering.

pub mod check;
pub mod explain;
pub mod init;
pub mod list;
pub mod render;

pub use check::check;
pub use explain::explain;
pub use init::init;
pub use list::list;
pub use render::render;
