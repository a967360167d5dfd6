mod args;
mod check;
mod completions;
mod explain;
mod init;
mod list;
mod render;

pub(crate) use args::{ParamArgs, TemplateArgs};
use check::CheckCommand;
use clap::{ArgAction, Parser, Subcommand};
use completions::CompletionsCommand;
use explain::ExplainCommand;
use eyre::Result;
use init::InitCommand;
use list::ListCommand;
use render::RenderCommand;

/// Extension trait for exiting on template or resolution errors with pretty formatting
pub(crate) trait UnwrapOrExit<T> {
    fn unwrap_or_exit(self) -> T;
}

impl<T> UnwrapOrExit<T> for gamehost_template::Result<T> {
    fn unwrap_or_exit(self) -> T {
        match self {
            Ok(v) => v,
            Err(e) => {
                eprintln!("{:?}", miette::Report::new(*e));
                std::process::exit(1);
            }
        }
    }
}

impl<T> UnwrapOrExit<T> for gamehost_resolve::Result<T> {
    fn unwrap_or_exit(self) -> T {
        match self {
            Ok(v) => v,
            Err(e) => {
                eprintln!("{:?}", miette::Report::new(e));
                std::process::exit(1);
            }
        }
    }
}

#[derive(Parser)]
#[command(name = "gamehost")]
#[command(version)]
#[command(about = "Resolve and validate Azure game-server templates")]
pub(crate) struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Only log errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

impl Cli {
    pub fn run(&self) -> Result<()> {
        match &self.command {
            Commands::Render(cmd) => cmd.run(),
            Commands::Check(cmd) => cmd.run(),
            Commands::Explain(cmd) => cmd.run(),
            Commands::List(cmd) => cmd.run(),
            Commands::Init(cmd) => cmd.run(),
            Commands::Completions(cmd) => cmd.run(),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve a template and print the resource graph as JSON
    Render(RenderCommand),

    /// Validate a template, and resolve it when parameters are given
    Check(CheckCommand),

    /// Show the resolution phases, lints and what a template declares
    Explain(ExplainCommand),

    /// List the built-in templates
    List(ListCommand),

    /// Write a parameter file skeleton for a template
    Init(InitCommand),

    /// Generate shell completions
    Completions(CompletionsCommand),
}
