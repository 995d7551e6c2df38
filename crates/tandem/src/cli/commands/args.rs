//! Arguments shared by several commands

use std::sync::Arc;

use anyhow::Context;
use clap::Args;
use tracing::info;

use tandem_core::config::BuildDepsMode;
use tandem_core::monorepo::{AffectedFilter, PrivateFilter, ScriptsFilter};
use tandem_core::{AffectedDetector, FilterPipeline, Workspace};
use tandem_git::GitVcs;
use tandem_tasks::{
    PlanSerializer, SchedulerOptions, TaskId, TaskReporterRegistry, TaskScheduler, TaskSet,
    TaskStatus,
};

use crate::cli::context::ProjectContext;
use crate::cli::output::{self, ConsoleReporter, PlanMode};
use crate::cli::{Cli, CliError};

/// Workspace selection filters
#[derive(Debug, Clone, Default, Args)]
pub struct FilterArgs {
    /// Only private workspaces
    #[arg(long, conflicts_with = "no_private")]
    pub private: bool,

    /// Only public workspaces
    #[arg(long)]
    pub no_private: bool,

    /// Only workspaces having at least one of these scripts
    #[arg(long, value_name = "SCRIPT", value_delimiter = ',')]
    pub with_script: Vec<String>,

    /// Only workspaces changed since BASE, or depending on one that did
    #[arg(long, value_name = "BASE", num_args = 0..=1, require_equals = true)]
    pub affected: Option<Option<String>>,
}

impl FilterArgs {
    /// Private flag requested, if any
    fn private_filter(&self) -> Option<PrivateFilter> {
        match (self.private, self.no_private) {
            (true, _) => Some(PrivateFilter(true)),
            (_, true) => Some(PrivateFilter(false)),
            _ => None,
        }
    }

    /// Workspaces passing every filter, in discovery order.
    ///
    /// `required_script` restricts the selection to workspaces declaring it.
    pub fn select<'g>(
        &self,
        ctx: &'g ProjectContext,
        required_script: Option<&str>,
    ) -> anyhow::Result<Vec<&'g Workspace>> {
        let mut detector = AffectedDetector::new(Box::new(GitVcs));
        let mut pipeline = FilterPipeline::new();

        if let Some(filter) = self.private_filter() {
            pipeline.add(filter);
        }
        if !self.with_script.is_empty() {
            pipeline.add(ScriptsFilter(self.with_script.clone()));
        }
        if let Some(script) = required_script {
            pipeline.add(ScriptsFilter(vec![script.to_string()]));
        }
        if let Some(base) = &self.affected {
            let base = base
                .clone()
                .unwrap_or_else(|| ctx.config.affected.base.clone());
            pipeline.add(AffectedFilter::new(&ctx.graph, &mut detector, base));
        }

        let selected = pipeline
            .filter(ctx.graph.workspaces())
            .collect::<tandem_core::Result<Vec<_>>>()?;

        info!(
            selected = selected.len(),
            filters = pipeline.len(),
            "workspaces selected"
        );
        Ok(selected)
    }
}

/// Options of commands that plan and run tasks
#[derive(Debug, Clone, Default, Args)]
pub struct TaskArgs {
    /// Which dependencies to build first (all, prod or none)
    #[arg(long, value_name = "MODE")]
    pub deps_mode: Option<BuildDepsMode>,

    /// Only print the tasks that would run
    #[arg(long)]
    pub plan: bool,

    /// Plan output mode
    #[arg(long, value_enum, default_value_t = PlanMode::List)]
    pub plan_mode: PlanMode,

    /// Keep running independent tasks when one fails
    #[arg(long)]
    pub continue_on_error: bool,
}

impl TaskArgs {
    /// Print the plan, or execute it
    pub fn execute(
        &self,
        cli: &Cli,
        ctx: &ProjectContext,
        tasks: &TaskSet,
        roots: &[TaskId],
    ) -> anyhow::Result<()> {
        if self.plan {
            let records = PlanSerializer::flatten(tasks, roots)?;
            return output::print_plan(&records, self.plan_mode);
        }

        if roots.is_empty() {
            output::warning("Nothing to run");
            return Ok(());
        }

        let mut reporters = TaskReporterRegistry::new();
        reporters.register(ConsoleReporter::new(cli.verbose));

        let options = SchedulerOptions {
            jobs: ctx.jobs(cli),
            continue_on_error: self.continue_on_error,
            dry_run: false,
        };
        let scheduler = TaskScheduler::new(options, Arc::new(reporters));

        let runtime = tokio::runtime::Runtime::new().context("failed to start runtime")?;
        let results = runtime.block_on(scheduler.execute(tasks, roots))?;

        let failed = results
            .iter()
            .filter(|r| matches!(r.status, TaskStatus::Failed(_)))
            .count();
        if failed > 0 {
            return Err(CliError::TasksFailed(failed).into());
        }

        Ok(())
    }
}
