//! Flattening task sets into ordered plans

use std::collections::{BTreeSet, HashMap, HashSet};

use serde::Serialize;
use tracing::{debug, instrument};

use crate::error::ScheduleError;
use crate::task::{TaskDescriptor, TaskId, TaskSet};

/// Workspace column value of group tasks
pub const GROUP_MARKER: &str = "group";

/// One line of a plan
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlanRecord {
    pub id: TaskId,
    pub name: String,
    /// Owning workspace, `None` for groups
    pub workspace: Option<String>,
    pub is_group: bool,
    /// Enclosing group
    pub group: Option<TaskId>,
    pub dependencies: Vec<TaskId>,
}

impl PlanRecord {
    fn new(task: &TaskDescriptor) -> Self {
        Self {
            id: task.id.clone(),
            name: task.name(),
            workspace: task.workspace().map(str::to_string),
            is_group: task.kind.is_group(),
            group: task.group.clone(),
            dependencies: task.dependencies.clone(),
        }
    }

    /// Workspace name, or the group marker
    pub fn workspace_label(&self) -> &str {
        self.workspace.as_deref().unwrap_or(GROUP_MARKER)
    }
}

/// Orders the tasks reachable from a set of roots
pub struct PlanSerializer;

impl PlanSerializer {
    /// Every task reachable from `roots`, dependencies first.
    ///
    /// Ties are broken by creation order, so a plan is stable for a given
    /// session.
    #[instrument(skip_all, fields(roots = roots.len()))]
    pub fn order<'t>(
        tasks: &'t TaskSet,
        roots: &[TaskId],
    ) -> Result<Vec<&'t TaskDescriptor>, ScheduleError> {
        let reachable = Self::reachable(tasks, roots)?;

        let mut in_degree: HashMap<&TaskId, usize> = HashMap::new();
        let mut dependents: HashMap<&TaskId, Vec<&'t TaskDescriptor>> = HashMap::new();
        let mut ready: BTreeSet<(usize, &TaskId)> = BTreeSet::new();

        for &task in &reachable {
            in_degree.insert(&task.id, task.dependencies.len());
            if task.dependencies.is_empty() {
                ready.insert((task.seq, &task.id));
            }
            for dep in &task.dependencies {
                dependents.entry(dep).or_default().push(task);
            }
        }

        let mut sorted = Vec::with_capacity(reachable.len());
        while let Some((_, id)) = ready.pop_first() {
            let Some(task) = tasks.get(id) else { continue };
            sorted.push(task);

            for dependent in dependents.get(id).into_iter().flatten() {
                if let Some(degree) = in_degree.get_mut(&dependent.id) {
                    *degree = degree.saturating_sub(1);
                    if *degree == 0 {
                        ready.insert((dependent.seq, &dependent.id));
                    }
                }
            }
        }

        if sorted.len() != reachable.len() {
            let done: HashSet<&TaskId> = sorted.iter().map(|t| &t.id).collect();
            let cyclic: Vec<String> = reachable
                .iter()
                .filter(|t| !done.contains(&t.id))
                .map(|t| t.id.short().to_string())
                .collect();
            return Err(ScheduleError::CyclicDependency(cyclic.join(", ")));
        }

        debug!(tasks = sorted.len(), "plan ordered");
        Ok(sorted)
    }

    /// Plan records for display or JSON output
    pub fn flatten(tasks: &TaskSet, roots: &[TaskId]) -> Result<Vec<PlanRecord>, ScheduleError> {
        Ok(Self::order(tasks, roots)?
            .into_iter()
            .map(PlanRecord::new)
            .collect())
    }

    /// Group ordered tasks into waves: each task lands one wave after its latest dependency
    pub fn waves(ordered: &[&TaskDescriptor]) -> Vec<Vec<TaskId>> {
        let mut wave_map: HashMap<&TaskId, usize> = HashMap::new();
        let mut waves: Vec<Vec<TaskId>> = Vec::new();

        for task in ordered {
            let wave = task
                .dependencies
                .iter()
                .filter_map(|dep| wave_map.get(dep))
                .max()
                .map(|w| w + 1)
                .unwrap_or(0);
            wave_map.insert(&task.id, wave);

            if waves.len() <= wave {
                waves.resize_with(wave + 1, Vec::new);
            }
            waves[wave].push(task.id.clone());
        }

        waves
    }

    /// Reachable closure of `roots`, in creation order
    fn reachable<'t>(
        tasks: &'t TaskSet,
        roots: &[TaskId],
    ) -> Result<Vec<&'t TaskDescriptor>, ScheduleError> {
        let mut seen: HashSet<&TaskId> = HashSet::new();
        let mut stack: Vec<&'t TaskDescriptor> = Vec::new();

        for root in roots {
            let task = tasks
                .get(root)
                .ok_or_else(|| ScheduleError::UnknownTask(root.clone()))?;
            if seen.insert(&task.id) {
                stack.push(task);
            }
        }

        let mut found = Vec::new();
        while let Some(task) = stack.pop() {
            found.push(task);
            for dep in &task.dependencies {
                let dep_task = tasks.get(dep).ok_or_else(|| ScheduleError::UnknownDependency {
                    task: task.id.clone(),
                    dependency: dep.clone(),
                })?;
                if seen.insert(&dep_task.id) {
                    stack.push(dep_task);
                }
            }
        }

        found.sort_by_key(|t| t.seq);
        Ok(found)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::TaskExpr;
    use crate::planner::TaskPlanner;
    use crate::testing::fixture;
    use tandem_core::config::BuildDepsMode;

    fn position(order: &[&TaskDescriptor], id: &TaskId) -> usize {
        order.iter().position(|t| &t.id == id).unwrap()
    }

    #[test]
    fn test_run_with_all_dependencies() {
        let graph = fixture();
        let wks_a = graph.workspace("wks-a").unwrap();
        let mut planner = TaskPlanner::new(&graph, "build");
        let run = planner.plan_run(wks_a, "start", &[], BuildDepsMode::All).unwrap();
        let tasks = planner.into_tasks();

        let records = PlanSerializer::flatten(&tasks, &[run.clone()]).unwrap();
        let summary: Vec<(&str, &str)> = records
            .iter()
            .map(|r| (r.name.as_str(), r.workspace_label()))
            .collect();

        assert_eq!(
            summary,
            vec![
                ("yarn run build", "wks-c"),
                ("yarn run build", "wks-b"),
                ("yarn run start", "wks-a"),
            ]
        );
        assert_eq!(records[1].dependencies, vec![records[0].id.clone()]);
        assert_eq!(
            records[2].dependencies,
            vec![records[1].id.clone(), records[0].id.clone()]
        );
        assert_eq!(records[2].id, run);
    }

    #[test]
    fn test_dependencies_come_first() {
        let graph = fixture();
        let mut planner = TaskPlanner::new(&graph, "build");
        let mut roots = Vec::new();
        for ws in graph.workspaces() {
            roots.push(planner.plan_run(ws, "start", &[], BuildDepsMode::All).unwrap());
        }
        let tasks = planner.into_tasks();

        let order = PlanSerializer::order(&tasks, &roots).unwrap();
        assert_eq!(order.len(), tasks.len());
        for task in &order {
            for dep in &task.dependencies {
                assert!(position(&order, dep) < position(&order, &task.id));
                assert_ne!(dep, &task.id);
            }
        }
    }

    #[test]
    fn test_only_reachable_tasks() {
        let graph = fixture();
        let mut planner = TaskPlanner::new(&graph, "build");
        let run_b = planner
            .plan_run(graph.workspace("wks-b").unwrap(), "start", &[], BuildDepsMode::All)
            .unwrap();
        planner
            .plan_run(graph.workspace("wks-a").unwrap(), "lint", &[], BuildDepsMode::None)
            .unwrap();
        let tasks = planner.into_tasks();

        let records = PlanSerializer::flatten(&tasks, &[run_b]).unwrap();
        assert_eq!(records.len(), 2);
        assert!(records.iter().all(|r| r.workspace.as_deref() != Some("wks-a")));
    }

    #[test]
    fn test_group_records() {
        let graph = fixture();
        let wks_a = graph.workspace("wks-a").unwrap();
        let mut planner = TaskPlanner::new(&graph, "build");
        let expr = TaskExpr::parse(&["lint", "//", "test"]).unwrap();
        let group = planner.compose(&expr, wks_a, BuildDepsMode::None).unwrap();
        let tasks = planner.into_tasks();

        let records = PlanSerializer::flatten(&tasks, &[group.clone()]).unwrap();
        assert_eq!(records.len(), 3);

        let last = &records[2];
        assert_eq!(last.id, group);
        assert!(last.is_group);
        assert_eq!(last.workspace_label(), GROUP_MARKER);
        assert!(records[..2].iter().all(|r| r.group.as_ref() == Some(&group)));

        let json = serde_json::to_value(&records).unwrap();
        assert_eq!(json[2]["workspace"], serde_json::Value::Null);
        assert_eq!(json[0]["group"], serde_json::json!(group.as_str()));
    }

    #[test]
    fn test_waves() {
        let graph = fixture();
        let wks_a = graph.workspace("wks-a").unwrap();
        let mut planner = TaskPlanner::new(&graph, "build");
        let expr = TaskExpr::parse(&["lint", "//", "test"]).unwrap();
        let group = planner.compose(&expr, wks_a, BuildDepsMode::All).unwrap();
        let tasks = planner.into_tasks();

        let order = PlanSerializer::order(&tasks, &[group]).unwrap();
        let waves = PlanSerializer::waves(&order);

        let sizes: Vec<usize> = waves.iter().map(Vec::len).collect();
        assert_eq!(sizes, vec![1, 1, 2, 1]);
    }

    #[test]
    fn test_unknown_root() {
        let graph = fixture();
        let mut planner = TaskPlanner::new(&graph, "build");
        let id = planner.plan_build(graph.workspace("wks-c").unwrap()).unwrap();

        let empty = TaskSet::new();
        assert!(matches!(
            PlanSerializer::flatten(&empty, &[id]),
            Err(ScheduleError::UnknownTask(_))
        ));
    }
}
