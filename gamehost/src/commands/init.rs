use std::path::PathBuf;

use clap::Args;
use dialoguer::{Select, theme::ColorfulTheme};
use eyre::{Context, Result};
use gamehost_template::{TemplateFile, builtin::BUILTINS};

use super::{TemplateArgs, UnwrapOrExit};
use crate::{
    ops,
    reports::{Report, TerminalOutput},
};

#[derive(Args)]
pub struct InitCommand {
    #[command(flatten)]
    pub template: TemplateArgs,

    /// Where to write the parameter file
    #[arg(short, long, default_value = "parameters.toml")]
    pub output: PathBuf,

    /// Overwrite an existing file
    #[arg(long)]
    pub force: bool,

    /// Pick a built-in template interactively
    #[arg(short, long, conflicts_with = "builtin")]
    pub interactive: bool,
}

impl InitCommand {
    pub fn run(&self) -> Result<()> {
        let file = if self.interactive {
            prompt_builtin()?
        } else {
            self.template.load().unwrap_or_exit()
        };

        let report = ops::init(file.template(), &self.output, self.force)?;
        report.render(&mut TerminalOutput::new());
        Ok(())
    }
}

fn prompt_builtin() -> Result<TemplateFile> {
    let items: Vec<String> = BUILTINS
        .iter()
        .map(|b| format!("{:20} {}", b.name, b.summary))
        .collect();

    let selection = Select::with_theme(&ColorfulTheme::default())
        .with_prompt("Template")
        .items(&items)
        .default(0)
        .interact()
        .wrap_err("Failed to read selection")?;

    Ok(TemplateFile::builtin(BUILTINS[selection].name).unwrap_or_exit())
}
