//! Exec command

use clap::Args;
use tracing::info;

use tandem_tasks::TaskPlanner;

use super::args::TaskArgs;
use crate::cli::context::ProjectContext;
use crate::cli::{Cli, CliError};

/// Run any command in a workspace, building its dependencies first
#[derive(Debug, Clone, Default, Args)]
pub struct ExecCommand {
    /// Workspace name (defaults to the one containing the current directory)
    #[arg(short, long)]
    pub workspace: Option<String>,

    #[command(flatten)]
    pub tasks: TaskArgs,

    /// Command to run, followed by its arguments
    #[arg(
        value_name = "COMMAND",
        trailing_var_arg = true,
        allow_hyphen_values = true
    )]
    pub command: Vec<String>,
}

impl ExecCommand {
    /// Execute the exec command
    pub fn execute(&self, cli: &Cli) -> anyhow::Result<()> {
        let Some((command, args)) = self.command.split_first() else {
            return Err(CliError::NoCommand.into());
        };
        info!(
            workspace = ?self.workspace,
            command = %command,
            "executing exec command"
        );

        let ctx = ProjectContext::load()?;
        let ws = ctx.workspace(self.workspace.as_deref())?;

        let mut planner = TaskPlanner::new(&ctx.graph, ctx.config.build_script.as_str());
        let root = planner.plan_exec(ws, command, args, ctx.deps_mode(self.tasks.deps_mode))?;
        let tasks = planner.into_tasks();

        self.tasks.execute(cli, &ctx, &tasks, &[root])
    }
}
