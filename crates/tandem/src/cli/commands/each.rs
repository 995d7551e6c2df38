//! Each command

use clap::Args;
use tracing::info;

use tandem_tasks::TaskPlanner;

use super::args::{FilterArgs, TaskArgs};
use crate::cli::context::ProjectContext;
use crate::cli::{Cli, CliError};

/// Run a script in every workspace declaring it
#[derive(Debug, Args)]
pub struct EachCommand {
    #[command(flatten)]
    pub filters: FilterArgs,

    #[command(flatten)]
    pub tasks: TaskArgs,

    /// Script to run
    pub script: String,

    /// Arguments passed to the script
    #[arg(last = true)]
    pub args: Vec<String>,
}

impl EachCommand {
    /// Execute the each command
    pub fn execute(&self, cli: &Cli) -> anyhow::Result<()> {
        info!(script = %self.script, "executing each command");
        let ctx = ProjectContext::load()?;

        let selected = self.filters.select(&ctx, Some(&self.script))?;
        if selected.is_empty() {
            return Err(CliError::NoWorkspace.into());
        }

        let mode = ctx.deps_mode(self.tasks.deps_mode);
        let mut planner = TaskPlanner::new(&ctx.graph, ctx.config.build_script.as_str());
        let roots = selected
            .iter()
            .map(|ws| planner.plan_run(ws, &self.script, &self.args, mode))
            .collect::<Result<Vec<_>, _>>()?;
        let tasks = planner.into_tasks();

        self.tasks.execute(cli, &ctx, &tasks, &roots)
    }
}
