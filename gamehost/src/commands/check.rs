use clap::Args;
use eyre::Result;

use super::{ParamArgs, TemplateArgs, UnwrapOrExit};
use crate::{
    inputs::{self, Environment},
    ops,
    reports::{Report, TerminalOutput},
};

// Without any parameter source only the lints run.
#[derive(Args)]
pub struct CheckCommand {
    #[command(flatten)]
    pub template: TemplateArgs,

    #[command(flatten)]
    pub params: ParamArgs,
}

impl CheckCommand {
    /// Run the check command
    pub fn run(&self) -> Result<()> {
        let file = self.template.load().unwrap_or_exit();
        let template = file.template();

        let parameters = if self.params.is_given() {
            Some(inputs::collect(
                template,
                &self.params,
                self.params.load_file(),
                &mut Environment,
            )?)
        } else {
            None
        };

        let report = ops::check(template, file.path(), parameters.as_ref())?;
        report.render(&mut TerminalOutput::new());

        if !report.is_valid() {
            std::process::exit(1);
        }

        Ok(())
    }
}
