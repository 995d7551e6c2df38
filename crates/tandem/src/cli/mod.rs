//! CLI definition and command handling

pub mod commands;
pub mod context;
pub mod output;

use clap::{Parser, Subcommand};
use thiserror::Error;

use commands::{
    CompletionsCommand, EachCommand, ExecCommand, GroupCommand, ListCommand, RunCommand,
    TreeCommand,
};

/// Tandem - Task runner for JavaScript monorepos
#[derive(Debug, Parser)]
#[command(name = "tandem")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
#[command(args_conflicts_with_subcommands = true)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Working directory
    #[arg(short = 'C', long, global = true)]
    pub directory: Option<std::path::PathBuf>,

    /// Maximum number of tasks running in parallel
    #[arg(short, long, global = true)]
    pub jobs: Option<usize>,

    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Without a subcommand, the arguments are an `exec` command line
    #[command(flatten)]
    pub exec: ExecCommand,
}

/// Available commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// List workspaces
    List(ListCommand),

    /// Print the dependency tree of a workspace
    Tree(TreeCommand),

    /// Run a script in a workspace, building its dependencies first
    Run(RunCommand),

    /// Run a script in every matching workspace
    Each(EachCommand),

    /// Run any command in a workspace, building its dependencies first (default)
    Exec(ExecCommand),

    /// Run several scripts of a workspace, e.g. `lint // test`
    Group(GroupCommand),

    /// Generate shell completions
    Completions(CompletionsCommand),
}

/// Errors raised by the CLI itself
#[derive(Debug, Error)]
pub enum CliError {
    /// Nothing matched the workspace selection
    #[error("No workspace found")]
    NoWorkspace,

    /// Neither a subcommand nor a command line was given
    #[error("No command given, see `tandem --help`")]
    NoCommand,

    /// Some tasks did not succeed
    #[error("{0} task(s) failed")]
    TasksFailed(usize),
}

impl Cli {
    /// Execute the CLI command
    pub fn execute(self) -> anyhow::Result<()> {
        // Change to specified directory if provided
        if let Some(dir) = &self.directory {
            std::env::set_current_dir(dir)?;
        }

        match &self.command {
            Some(Commands::List(cmd)) => cmd.execute(&self),
            Some(Commands::Tree(cmd)) => cmd.execute(&self),
            Some(Commands::Run(cmd)) => cmd.execute(&self),
            Some(Commands::Each(cmd)) => cmd.execute(&self),
            Some(Commands::Exec(cmd)) => cmd.execute(&self),
            Some(Commands::Group(cmd)) => cmd.execute(&self),
            Some(Commands::Completions(cmd)) => cmd.execute(&self),
            None => self.exec.execute(&self),
        }
    }
}
