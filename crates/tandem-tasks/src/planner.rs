//! Task planning: build and run descriptors for workspaces

use std::collections::{HashMap, HashSet};

use tracing::{debug, instrument, warn};

use tandem_core::config::BuildDepsMode;
use tandem_core::{Workspace, WorkspaceGraph};

use crate::error::{PlanError, Result};
use crate::task::{ScriptTask, TaskId, TaskKind, TaskSet};

/// One planning session over a workspace graph.
///
/// The session owns the task arena and the build cache, so every workspace
/// gets at most one build task no matter how many dependents request it.
/// Sessions are independent: start a new planner to plan from scratch.
pub struct TaskPlanner<'g> {
    graph: &'g WorkspaceGraph,
    build_script: String,
    tasks: TaskSet,
    builds: HashMap<String, TaskId>,
}

/// Pending build in the post-order walk
struct Frame<'g> {
    ws: &'g Workspace,
    deps: Vec<&'g Workspace>,
    next: usize,
    ids: Vec<TaskId>,
}

impl<'g> Frame<'g> {
    fn new(graph: &'g WorkspaceGraph, ws: &'g Workspace) -> Self {
        Self {
            ws,
            deps: graph.all_dependencies(ws).collect(),
            next: 0,
            ids: Vec::new(),
        }
    }
}

impl<'g> TaskPlanner<'g> {
    /// Start a planning session
    pub fn new(graph: &'g WorkspaceGraph, build_script: impl Into<String>) -> Self {
        Self {
            graph,
            build_script: build_script.into(),
            tasks: TaskSet::new(),
            builds: HashMap::new(),
        }
    }

    /// Graph being planned
    pub fn graph(&self) -> &'g WorkspaceGraph {
        self.graph
    }

    /// Tasks planned so far
    pub fn tasks(&self) -> &TaskSet {
        &self.tasks
    }

    /// End the session, keeping the planned tasks
    pub fn into_tasks(self) -> TaskSet {
        self.tasks
    }

    /// Build task of a workspace, planning it and its dependency builds on first use.
    ///
    /// Dependencies and dev dependencies are built first. A dependency cycle
    /// is cut at the workspace already being planned.
    #[instrument(skip_all, fields(workspace = %ws.name()))]
    pub fn plan_build(&mut self, ws: &Workspace) -> Result<TaskId> {
        if let Some(id) = self.builds.get(ws.name()) {
            debug!(workspace = %ws.name(), "build task reused");
            return Ok(id.clone());
        }

        let graph = self.graph;
        let root = graph.require(ws.name())?;

        let mut in_progress: HashSet<&str> = HashSet::from([root.name()]);
        let mut parents: Vec<Frame<'g>> = Vec::new();
        let mut current = Frame::new(graph, root);

        loop {
            if current.next < current.deps.len() {
                let dep = current.deps[current.next];
                current.next += 1;

                if let Some(id) = self.builds.get(dep.name()) {
                    current.ids.push(id.clone());
                } else if in_progress.contains(dep.name()) {
                    warn!(
                        workspace = %current.ws.name(),
                        dependency = %dep.name(),
                        "dependency cycle, build order edge dropped"
                    );
                } else {
                    in_progress.insert(dep.name());
                    parents.push(std::mem::replace(&mut current, Frame::new(graph, dep)));
                }
                continue;
            }

            in_progress.remove(current.ws.name());
            let task = self.script_task(current.ws, &self.build_script, &[]);
            let id = self
                .tasks
                .push(TaskKind::Build(task), std::mem::take(&mut current.ids));
            self.builds.insert(current.ws.name().to_string(), id.clone());
            debug!(workspace = %current.ws.name(), id = %id.short(), "build task planned");

            match parents.pop() {
                Some(parent) => {
                    current = parent;
                    current.ids.push(id);
                }
                None => return Ok(id),
            }
        }
    }

    /// Plan `script` in `ws`, building its dependencies according to `mode`
    pub fn plan_run(
        &mut self,
        ws: &Workspace,
        script: &str,
        args: &[String],
        mode: BuildDepsMode,
    ) -> Result<TaskId> {
        self.plan_run_with(ws, script, args, mode, &[])
    }

    /// Like [`plan_run`](Self::plan_run), with extra tasks to wait for
    #[instrument(skip_all, fields(workspace = %ws.name(), script = %script, mode = %mode))]
    pub fn plan_run_with(
        &mut self,
        ws: &Workspace,
        script: &str,
        args: &[String],
        mode: BuildDepsMode,
        after: &[TaskId],
    ) -> Result<TaskId> {
        if !ws.has_script(script) {
            return Err(PlanError::ScriptNotFound {
                workspace: ws.name().to_string(),
                script: script.to_string(),
            });
        }

        let mut deps = self.plan_dependency_builds(ws, mode)?;
        deps.extend(after.iter().cloned());

        let task = self.script_task(ws, script, args);
        let id = self.tasks.push(TaskKind::Run(task), deps);
        debug!(id = %id.short(), "run task planned");
        Ok(id)
    }

    /// Plan an arbitrary command in `ws`, building its dependencies according to `mode`.
    ///
    /// The command goes through the package manager's exec launcher when it
    /// has one, so binaries installed by the project are found.
    #[instrument(skip_all, fields(workspace = %ws.name(), command = %command, mode = %mode))]
    pub fn plan_exec(
        &mut self,
        ws: &Workspace,
        command: &str,
        args: &[String],
        mode: BuildDepsMode,
    ) -> Result<TaskId> {
        let deps = self.plan_dependency_builds(ws, mode)?;

        let (program, argv) = self.graph.package_manager().exec_for(command, args);
        let task = ScriptTask {
            workspace: ws.name().to_string(),
            cwd: ws.root().to_path_buf(),
            script: command.to_string(),
            args: args.to_vec(),
            program,
            argv,
        };
        let id = self.tasks.push(TaskKind::Run(task), deps);
        debug!(id = %id.short(), "exec task planned");
        Ok(id)
    }

    /// Build tasks of the direct dependencies selected by `mode`
    fn plan_dependency_builds(&mut self, ws: &Workspace, mode: BuildDepsMode) -> Result<Vec<TaskId>> {
        let graph = self.graph;
        let mut deps = Vec::new();

        if mode.includes_prod() {
            for dep in graph.dependencies(ws) {
                deps.push(self.plan_build(dep)?);
            }
        }

        if mode.includes_dev() {
            for dep in graph.dev_dependencies(ws) {
                deps.push(self.plan_build(dep)?);
            }
        }

        Ok(deps)
    }

    pub(crate) fn tasks_mut(&mut self) -> &mut TaskSet {
        &mut self.tasks
    }

    fn script_task(&self, ws: &Workspace, script: &str, args: &[String]) -> ScriptTask {
        let (program, argv) = self.graph.package_manager().command_for(script, args);
        ScriptTask {
            workspace: ws.name().to_string(),
            cwd: ws.root().to_path_buf(),
            script: script.to_string(),
            args: args.to_vec(),
            program,
            argv,
        }
    }
}
