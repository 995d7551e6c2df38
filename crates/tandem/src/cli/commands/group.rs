//! Group command

use clap::Args;
use tracing::info;

use tandem_tasks::{TaskExpr, TaskPlanner};

use super::args::TaskArgs;
use crate::cli::context::ProjectContext;
use crate::cli::Cli;

/// Run several scripts of one workspace
#[derive(Debug, Args)]
pub struct GroupCommand {
    /// Workspace name (defaults to the one containing the current directory)
    #[arg(short, long)]
    pub workspace: Option<String>,

    #[command(flatten)]
    pub tasks: TaskArgs,

    /// Scripts separated by `//` to run in parallel, or by nothing to run in sequence
    #[arg(required = true, value_name = "EXPR")]
    pub expr: Vec<String>,
}

impl GroupCommand {
    /// Execute the group command
    pub fn execute(&self, cli: &Cli) -> anyhow::Result<()> {
        let expr = TaskExpr::parse(&self.expr)?;
        info!(workspace = ?self.workspace, expr = %expr, "executing group command");

        let ctx = ProjectContext::load()?;
        let ws = ctx.workspace(self.workspace.as_deref())?;

        let mut planner = TaskPlanner::new(&ctx.graph, ctx.config.build_script.as_str());
        let root = planner.compose(&expr, ws, ctx.deps_mode(self.tasks.deps_mode))?;
        let tasks = planner.into_tasks();

        self.tasks.execute(cli, &ctx, &tasks, &[root])
    }
}
