//! Turn task expressions into group tasks

use tracing::{debug, instrument};

use tandem_core::config::BuildDepsMode;
use tandem_core::Workspace;

use crate::error::Result;
use crate::expr::TaskExpr;
use crate::task::{GroupOperator, GroupTask, TaskId, TaskKind};
use crate::planner::TaskPlanner;

impl TaskPlanner<'_> {
    /// Plan an expression in `ws`.
    ///
    /// A lone script yields its run task. Each group level yields a group task
    /// depending on all of its children. In a sequential group every child
    /// waits for the previous one; parallel children share the same
    /// dependencies.
    #[instrument(skip_all, fields(workspace = %ws.name(), expr = %expr, mode = %mode))]
    pub fn compose(&mut self, expr: &TaskExpr, ws: &Workspace, mode: BuildDepsMode) -> Result<TaskId> {
        self.compose_after(expr, ws, mode, &[])
    }

    fn compose_after(
        &mut self,
        expr: &TaskExpr,
        ws: &Workspace,
        mode: BuildDepsMode,
        after: &[TaskId],
    ) -> Result<TaskId> {
        match expr {
            TaskExpr::Script { script, args } => self.plan_run_with(ws, script, args, mode, after),
            TaskExpr::Group { operator, children } => {
                let mut ids: Vec<TaskId> = Vec::with_capacity(children.len());

                for child in children {
                    let id = match (operator, ids.last()) {
                        (GroupOperator::Sequential, Some(prev)) => {
                            let prev = [prev.clone()];
                            self.compose_after(child, ws, mode, &prev)?
                        }
                        _ => self.compose_after(child, ws, mode, after)?,
                    };
                    ids.push(id);
                }

                let group = GroupTask {
                    name: expr.to_string(),
                    operator: *operator,
                    children: ids.clone(),
                };
                let tasks = self.tasks_mut();
                let group_id = tasks.push(TaskKind::Group(group), ids.clone());
                for child in &ids {
                    tasks.assign_group(child, &group_id);
                }

                debug!(id = %group_id.short(), operator = %operator, children = ids.len(), "group task planned");
                Ok(group_id)
            }
        }
    }
}
