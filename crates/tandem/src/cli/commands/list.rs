//! List command

use std::path::Path;

use clap::Args;
use serde::Serialize;
use tracing::info;

use tandem_core::Workspace;

use super::args::FilterArgs;
use crate::cli::context::ProjectContext;
use crate::cli::output::{self, Table};
use crate::cli::Cli;

/// List workspaces
#[derive(Debug, Args)]
pub struct ListCommand {
    #[command(flatten)]
    pub filters: FilterArgs,

    /// Print name, version and location
    #[arg(short, long, conflicts_with = "json")]
    pub long: bool,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// JSON form of a listed workspace
#[derive(Debug, Serialize)]
struct WorkspaceEntry<'a> {
    name: &'a str,
    version: &'a str,
    root: String,
    private: bool,
}

impl ListCommand {
    /// Execute the list command
    pub fn execute(&self, _cli: &Cli) -> anyhow::Result<()> {
        info!(long = self.long, json = self.json, "executing list command");
        let ctx = ProjectContext::load()?;
        let selected = self.filters.select(&ctx, None)?;

        if self.json {
            let entries = entries(&ctx, &selected);
            println!("{}", serde_json::to_string_pretty(&entries)?);
            return Ok(());
        }

        if selected.is_empty() {
            output::warning("No workspace found");
            return Ok(());
        }

        if self.long {
            let mut table = Table::new(["Name", "Version", "Root"]);
            for entry in entries(&ctx, &selected) {
                table.row([
                    entry.name.to_string(),
                    entry.version.to_string(),
                    output::path_style().apply_to(entry.root).to_string(),
                ]);
            }
            table.print();
        } else {
            for ws in &selected {
                println!("{}", ws.name());
            }
        }

        Ok(())
    }
}

fn entries<'a>(ctx: &ProjectContext, selected: &[&'a Workspace]) -> Vec<WorkspaceEntry<'a>> {
    selected
        .iter()
        .map(|ws| WorkspaceEntry {
            name: ws.name(),
            version: ws.version(),
            root: relative_root(ctx.graph.root(), ws.root()),
            private: ws.is_private(),
        })
        .collect()
}

/// Workspace root relative to the project root, `.` for the project itself
fn relative_root(project: &Path, root: &Path) -> String {
    match root.strip_prefix(project) {
        Ok(rel) if rel.as_os_str().is_empty() => ".".to_string(),
        Ok(rel) => rel.display().to_string(),
        Err(_) => root.display().to_string(),
    }
}
