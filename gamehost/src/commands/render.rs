use std::path::PathBuf;

use clap::Args;
use eyre::Result;

use super::{ParamArgs, TemplateArgs, UnwrapOrExit};
use crate::{
    inputs::{self, Environment},
    ops,
    reports::{Report, TerminalOutput},
};

#[derive(Args)]
pub struct RenderCommand {
    #[command(flatten)]
    pub template: TemplateArgs,

    #[command(flatten)]
    pub params: ParamArgs,

    /// Write the JSON to a file instead of stdout
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,
}

impl RenderCommand {
    pub fn run(&self) -> Result<()> {
        let file = self.template.load().unwrap_or_exit();
        let template = file.template();

        let parameters = inputs::collect(
            template,
            &self.params,
            self.params.load_file(),
            &mut Environment,
        )?;
        let resolution = gamehost_resolve::resolve(template, &parameters).unwrap_or_exit();

        let report = ops::render(&resolution, self.output.as_deref())?;
        report.render(&mut TerminalOutput::new());

        Ok(())
    }
}
