//! Error types for task planning and scheduling

use tandem_core::TandemError;
use thiserror::Error;

use crate::task::TaskId;

/// Result type alias for planning operations
pub type Result<T> = std::result::Result<T, PlanError>;

/// Errors raised while planning tasks
#[derive(Debug, Error)]
pub enum PlanError {
    /// The requested script is not declared by the workspace
    #[error("Script '{script}' not found in workspace '{workspace}'")]
    ScriptNotFound { workspace: String, script: String },

    /// Malformed task expression
    #[error("Invalid task expression: {0}")]
    ExpressionSyntax(String),

    /// Workspace graph or VCS failure
    #[error(transparent)]
    Core(#[from] TandemError),
}

/// Errors raised while ordering or executing a task set
#[derive(Debug, Error)]
pub enum ScheduleError {
    /// A dependency id does not belong to the task set
    #[error("Task {task} depends on unknown task {dependency}")]
    UnknownDependency { task: TaskId, dependency: TaskId },

    /// A root id does not belong to the task set
    #[error("Unknown task {0}")]
    UnknownTask(TaskId),

    /// Tasks that could not be ordered
    #[error("Cyclic dependency between tasks: {0}")]
    CyclicDependency(String),
}
