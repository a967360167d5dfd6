//! Report data structures for commands.
//!
//! This module provides data structures that separate data collection from rendering.
//! Commands build reports, then render them to an Output target.

mod check;
mod explain;
mod init;
mod list;
mod output;
mod render;

pub use check::{CheckReport, ResolvedSummary};
pub use explain::{
    ExplainReport, LintInfo, OutputInfo, ParameterInfo, PhaseInfo, ResourceInfo, TemplateInfo,
};
pub use init::InitReport;
pub use list::{BuiltinInfo, ListReport};
pub use output::{Report, TerminalOutput};
pub use render::{OutputSummary, RenderReport};

#[cfg(test)]
pub(crate) use output::Recorder;
