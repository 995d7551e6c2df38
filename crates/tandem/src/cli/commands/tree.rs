//! Tree command

use clap::Args;
use tracing::info;

use crate::cli::context::ProjectContext;
use crate::cli::output;
use crate::cli::Cli;

/// Print the dependency tree of a workspace
#[derive(Debug, Args)]
pub struct TreeCommand {
    /// Workspace name (defaults to the one containing the current directory)
    #[arg(short, long)]
    pub workspace: Option<String>,
}

impl TreeCommand {
    /// Execute the tree command
    pub fn execute(&self, _cli: &Cli) -> anyhow::Result<()> {
        info!(workspace = ?self.workspace, "executing tree command");
        let ctx = ProjectContext::load()?;
        for line in self.render(&ctx)? {
            println!("{}", line);
        }
        Ok(())
    }

    fn render(&self, ctx: &ProjectContext) -> anyhow::Result<Vec<String>> {
        let ws = ctx.workspace(self.workspace.as_deref())?;
        Ok(output::render_tree(&ctx.graph, ws))
    }
}
