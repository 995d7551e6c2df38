//! Plan rendering for `--plan`

use clap::ValueEnum;
use console::style;

use tandem_tasks::PlanRecord;

use super::Table;

/// How `--plan` prints tasks
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum PlanMode {
    /// Aligned table with shortened ids
    #[default]
    List,
    /// Full records as JSON
    Json,
}

/// Print plan records in the requested mode
pub fn print_plan(records: &[PlanRecord], mode: PlanMode) -> anyhow::Result<()> {
    match mode {
        PlanMode::Json => println!("{}", serde_json::to_string_pretty(records)?),
        PlanMode::List => plan_table(records).print(),
    }
    Ok(())
}

fn plan_table(records: &[PlanRecord]) -> Table {
    let mut table = Table::new(["Id", "Name", "Workspace", "Group", "Depends on"]);

    for record in records {
        let workspace = if record.is_group {
            style(record.workspace_label()).dim().to_string()
        } else {
            record.workspace_label().to_string()
        };
        let group = record
            .group
            .as_ref()
            .map(|id| id.short().to_string())
            .unwrap_or_default();
        let depends_on = record
            .dependencies
            .iter()
            .map(|id| id.short())
            .collect::<Vec<_>>()
            .join(", ");

        table.row([
            record.id.short().to_string(),
            record.name.clone(),
            workspace,
            group,
            depends_on,
        ]);
    }

    table
}
