//! Run command

use clap::Args;
use tracing::info;

use tandem_tasks::TaskPlanner;

use super::args::TaskArgs;
use crate::cli::context::ProjectContext;
use crate::cli::Cli;

/// Run a script in a workspace, building its dependencies first
#[derive(Debug, Args)]
pub struct RunCommand {
    /// Workspace name (defaults to the one containing the current directory)
    #[arg(short, long)]
    pub workspace: Option<String>,

    #[command(flatten)]
    pub tasks: TaskArgs,

    /// Script to run
    pub script: String,

    /// Arguments passed to the script
    #[arg(last = true)]
    pub args: Vec<String>,
}

impl RunCommand {
    /// Execute the run command
    pub fn execute(&self, cli: &Cli) -> anyhow::Result<()> {
        info!(
            workspace = ?self.workspace,
            script = %self.script,
            "executing run command"
        );
        let ctx = ProjectContext::load()?;
        let ws = ctx.workspace(self.workspace.as_deref())?;

        let mut planner = TaskPlanner::new(&ctx.graph, ctx.config.build_script.as_str());
        let root = planner.plan_run(
            ws,
            &self.script,
            &self.args,
            ctx.deps_mode(self.tasks.deps_mode),
        )?;
        let tasks = planner.into_tasks();

        self.tasks.execute(cli, &ctx, &tasks, &[root])
    }
}
