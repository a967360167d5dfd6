use clap::Args;
use eyre::Result;

use super::{TemplateArgs, UnwrapOrExit};
use crate::{
    ops,
    reports::{Report, TerminalOutput},
};

#[derive(Args)]
pub struct ExplainCommand {
    #[command(flatten)]
    pub template: TemplateArgs,
}

impl ExplainCommand {
    pub fn run(&self) -> Result<()> {
        let file = self.template.load().unwrap_or_exit();
        let report = ops::explain(file.template(), file.path())?;
        report.render(&mut TerminalOutput::new());
        Ok(())
    }
}
