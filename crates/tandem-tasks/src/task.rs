//! Task types and the per-session task arena

use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Number of hex characters shown for shortened ids
pub const SHORT_ID_LEN: usize = 6;

/// Unique identifier of a task within a planning session
#[derive(Debug, Clone, Hash, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(String);

impl TaskId {
    /// Derive an id from the task's creation sequence and identity
    fn derive(seq: usize, identity: &str) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(seq.to_le_bytes());
        hasher.update(identity.as_bytes());
        Self(format!("{:x}", hasher.finalize()))
    }

    /// Full hex id
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// First six hex characters, as shown in plan listings
    pub fn short(&self) -> &str {
        let end = self.0.len().min(SHORT_ID_LEN);
        &self.0[..end]
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A package manager script executed in a workspace
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScriptTask {
    /// Owning workspace name
    pub workspace: String,
    /// Workspace root, used as working directory
    pub cwd: PathBuf,
    /// Script name from the manifest
    pub script: String,
    /// Extra arguments forwarded to the script
    pub args: Vec<String>,
    /// Launcher program (npm, yarn, pnpm)
    pub program: String,
    /// Launcher arguments
    pub argv: Vec<String>,
}

impl ScriptTask {
    /// Full command line, e.g. `yarn run build`
    pub fn command_line(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.argv.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// How the children of a group are ordered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GroupOperator {
    /// Each child waits for the previous one
    Sequential,
    /// Children run without mutual ordering
    Parallel,
}

impl fmt::Display for GroupOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sequential => write!(f, "sequential"),
            Self::Parallel => write!(f, "parallel"),
        }
    }
}

/// A composite task wrapping one level of a task expression
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GroupTask {
    /// Expression text of this level
    pub name: String,
    pub operator: GroupOperator,
    /// Child task ids in expression order
    pub children: Vec<TaskId>,
}

/// What a task does
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum TaskKind {
    /// Build script of a dependency workspace
    Build(ScriptTask),
    /// Script requested by the user
    Run(ScriptTask),
    /// Composition of other tasks
    Group(GroupTask),
}

impl TaskKind {
    /// Identity hashed into the task id
    fn identity(&self) -> String {
        match self {
            Self::Build(task) => format!("build\0{}\0{}", task.workspace, task.script),
            Self::Run(task) => format!(
                "run\0{}\0{}\0{}",
                task.workspace,
                task.script,
                task.args.join("\0")
            ),
            Self::Group(group) => format!(
                "group\0{}\0{}",
                group.operator,
                group
                    .children
                    .iter()
                    .map(TaskId::as_str)
                    .collect::<Vec<_>>()
                    .join("\0")
            ),
        }
    }

    /// Script task behind a build or run
    pub fn script(&self) -> Option<&ScriptTask> {
        match self {
            Self::Build(task) | Self::Run(task) => Some(task),
            Self::Group(_) => None,
        }
    }

    /// Whether this is a group
    pub fn is_group(&self) -> bool {
        matches!(self, Self::Group(_))
    }
}

/// A planned unit of work
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskDescriptor {
    pub id: TaskId,
    /// Creation order within the session
    pub seq: usize,
    pub kind: TaskKind,
    /// Tasks that must complete before this one
    pub dependencies: Vec<TaskId>,
    /// Enclosing group, if any
    pub group: Option<TaskId>,
}

impl TaskDescriptor {
    /// Display name: the launcher command line, or the expression of a group
    pub fn name(&self) -> String {
        match &self.kind {
            TaskKind::Build(task) | TaskKind::Run(task) => task.command_line(),
            TaskKind::Group(group) => group.name.clone(),
        }
    }

    /// Progress label, e.g. `Running build in wks-c`
    pub fn label(&self) -> String {
        match &self.kind {
            TaskKind::Build(task) | TaskKind::Run(task) => {
                format!("Running {} in {}", task.script, task.workspace)
            }
            TaskKind::Group(group) => group.name.clone(),
        }
    }

    /// Owning workspace name, absent for groups
    pub fn workspace(&self) -> Option<&str> {
        self.kind.script().map(|task| task.workspace.as_str())
    }
}

/// Arena of the tasks created in one planning session, in creation order
#[derive(Debug, Clone, Default)]
pub struct TaskSet {
    tasks: Vec<TaskDescriptor>,
    index: HashMap<TaskId, usize>,
}

impl TaskSet {
    /// Create an empty task set
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a task; duplicate dependency ids are collapsed
    pub(crate) fn push(&mut self, kind: TaskKind, dependencies: Vec<TaskId>) -> TaskId {
        let seq = self.tasks.len();
        let id = TaskId::derive(seq, &kind.identity());

        let mut unique = Vec::with_capacity(dependencies.len());
        for dep in dependencies {
            if dep != id && !unique.contains(&dep) {
                unique.push(dep);
            }
        }

        self.index.insert(id.clone(), seq);
        self.tasks.push(TaskDescriptor {
            id: id.clone(),
            seq,
            kind,
            dependencies: unique,
            group: None,
        });
        id
    }

    /// Record the enclosing group of a child task
    pub(crate) fn assign_group(&mut self, child: &TaskId, group: &TaskId) {
        if let Some(&idx) = self.index.get(child) {
            self.tasks[idx].group = Some(group.clone());
        }
    }

    /// Get a task by id
    pub fn get(&self, id: &TaskId) -> Option<&TaskDescriptor> {
        self.index.get(id).map(|&idx| &self.tasks[idx])
    }

    /// Whether the set holds this id
    pub fn contains(&self, id: &TaskId) -> bool {
        self.index.contains_key(id)
    }

    /// All tasks in creation order
    pub fn iter(&self) -> std::slice::Iter<'_, TaskDescriptor> {
        self.tasks.iter()
    }

    /// Number of tasks
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    /// Whether no task was planned
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn script(workspace: &str, script: &str) -> ScriptTask {
        ScriptTask {
            workspace: workspace.to_string(),
            cwd: PathBuf::from("/project").join(workspace),
            script: script.to_string(),
            args: Vec::new(),
            program: "yarn".to_string(),
            argv: vec!["run".to_string(), script.to_string()],
        }
    }

    #[test]
    fn test_ids_are_unique_per_session() {
        let mut set = TaskSet::new();
        let a = set.push(TaskKind::Run(script("wks-a", "start")), vec![]);
        let b = set.push(TaskKind::Run(script("wks-a", "start")), vec![]);

        assert_ne!(a, b);
        assert_eq!(a.as_str().len(), 64);
        assert_eq!(a.short().len(), SHORT_ID_LEN);
        assert!(a.as_str().starts_with(a.short()));
    }

    #[test]
    fn test_ids_are_deterministic() {
        let mut first = TaskSet::new();
        let mut second = TaskSet::new();
        let a = first.push(TaskKind::Build(script("wks-c", "build")), vec![]);
        let b = second.push(TaskKind::Build(script("wks-c", "build")), vec![]);
        assert_eq!(a, b);
    }

    #[test]
    fn test_duplicate_dependencies_are_collapsed() {
        let mut set = TaskSet::new();
        let c = set.push(TaskKind::Build(script("wks-c", "build")), vec![]);
        let a = set.push(
            TaskKind::Run(script("wks-a", "start")),
            vec![c.clone(), c.clone()],
        );

        assert_eq!(set.get(&a).unwrap().dependencies, vec![c]);
    }

    #[test]
    fn test_names_and_labels() {
        let mut set = TaskSet::new();
        let id = set.push(TaskKind::Build(script("wks-c", "build")), vec![]);
        let task = set.get(&id).unwrap();

        assert_eq!(task.name(), "yarn run build");
        assert_eq!(task.label(), "Running build in wks-c");
        assert_eq!(task.workspace(), Some("wks-c"));
        assert_eq!(task.seq, 0);
    }

    #[test]
    fn test_assign_group() {
        let mut set = TaskSet::new();
        let child = set.push(TaskKind::Run(script("wks", "a")), vec![]);
        let group = set.push(
            TaskKind::Group(GroupTask {
                name: "a".to_string(),
                operator: GroupOperator::Sequential,
                children: vec![child.clone()],
            }),
            vec![child.clone()],
        );
        set.assign_group(&child, &group);

        assert_eq!(set.get(&child).unwrap().group.as_ref(), Some(&group));
        assert!(set.get(&group).unwrap().kind.is_group());
        assert_eq!(set.get(&group).unwrap().workspace(), None);
    }
}
