//! Tandem Tasks - Task planning and orchestration engine
//!
//! This crate turns workspace queries into a DAG of build, run and group
//! tasks, flattens it into a deterministic plan, and executes it with
//! bounded parallelism.

pub mod composer;
pub mod error;
pub mod expr;
pub mod plan;
pub mod planner;
pub mod reporter;
pub mod scheduler;
pub mod task;

#[cfg(test)]
mod testing;

pub use error::{PlanError, Result, ScheduleError};
pub use expr::{TaskExpr, PARALLEL_OPERATOR};
pub use plan::{PlanRecord, PlanSerializer, GROUP_MARKER};
pub use planner::TaskPlanner;
pub use reporter::{CollectingReporter, TaskEvent, TaskReporter, TaskReporterRegistry, TracingReporter};
pub use scheduler::{SchedulerOptions, TaskResult, TaskScheduler, TaskStatus};
pub use task::{GroupOperator, GroupTask, ScriptTask, TaskDescriptor, TaskId, TaskKind, TaskSet};
