//! Task execution reporting

use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::task::TaskId;

/// Events emitted during task execution
#[derive(Debug, Clone)]
pub enum TaskEvent {
    /// A task is starting execution
    Started {
        id: TaskId,
        label: String,
        command: String,
    },
    /// A task produced output
    Output {
        id: TaskId,
        label: String,
        line: String,
        is_stderr: bool,
    },
    /// A task completed successfully
    Completed {
        id: TaskId,
        label: String,
        duration: Duration,
    },
    /// A task failed
    Failed {
        id: TaskId,
        label: String,
        duration: Duration,
        error: String,
    },
    /// A task was not executed
    Skipped {
        id: TaskId,
        label: String,
        reason: String,
    },
    /// An execution wave is starting
    WaveStarted { wave: usize, task_count: usize },
    /// All tasks completed
    AllCompleted {
        total: usize,
        succeeded: usize,
        failed: usize,
        skipped: usize,
        duration: Duration,
    },
}

/// Trait for reporting task execution progress
pub trait TaskReporter: Send + Sync {
    /// Handle a task event
    fn report(&self, event: &TaskEvent);
}

/// Simple reporter that logs to tracing
#[derive(Debug, Default)]
pub struct TracingReporter;

impl TaskReporter for TracingReporter {
    fn report(&self, event: &TaskEvent) {
        match event {
            TaskEvent::Started { id, label, command } => {
                tracing::info!(id = %id.short(), command = %command, "{}", label);
            }
            TaskEvent::Output {
                label,
                line,
                is_stderr,
                ..
            } => {
                if *is_stderr {
                    tracing::warn!("[{}] {}", label, line);
                } else {
                    tracing::debug!("[{}] {}", label, line);
                }
            }
            TaskEvent::Completed { label, duration, .. } => {
                tracing::info!("{} completed in {:.1}s", label, duration.as_secs_f64());
            }
            TaskEvent::Failed {
                label,
                duration,
                error,
                ..
            } => {
                tracing::error!("{} failed after {:.1}s: {}", label, duration.as_secs_f64(), error);
            }
            TaskEvent::Skipped { label, reason, .. } => {
                tracing::info!("{} skipped: {}", label, reason);
            }
            TaskEvent::WaveStarted { wave, task_count } => {
                tracing::debug!("Starting wave {} ({} tasks)", wave, task_count);
            }
            TaskEvent::AllCompleted {
                total,
                succeeded,
                failed,
                skipped,
                duration,
            } => {
                tracing::info!(
                    "All tasks complete: {}/{} succeeded, {} failed, {} skipped ({:.1}s)",
                    succeeded,
                    total,
                    failed,
                    skipped,
                    duration.as_secs_f64()
                );
            }
        }
    }
}

/// Reporter that collects events for later inspection (useful for testing)
#[derive(Debug, Default)]
pub struct CollectingReporter {
    events: Mutex<Vec<TaskEvent>>,
}

impl CollectingReporter {
    /// Get all collected events
    pub fn events(&self) -> Vec<TaskEvent> {
        self.events
            .lock()
            .map(|events| events.clone())
            .unwrap_or_default()
    }
}

impl TaskReporter for CollectingReporter {
    fn report(&self, event: &TaskEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event.clone());
        }
    }
}

/// Fans events out to several reporters
pub struct TaskReporterRegistry {
    reporters: Vec<Arc<dyn TaskReporter>>,
}

impl TaskReporterRegistry {
    pub fn new() -> Self {
        Self {
            reporters: vec![Arc::new(TracingReporter)],
        }
    }

    pub fn empty() -> Self {
        Self {
            reporters: Vec::new(),
        }
    }

    pub fn register<R: TaskReporter + 'static>(&mut self, reporter: R) {
        self.reporters.push(Arc::new(reporter));
    }

    pub fn register_shared(&mut self, reporter: Arc<dyn TaskReporter>) {
        self.reporters.push(reporter);
    }

    pub fn all(&self) -> &[Arc<dyn TaskReporter>] {
        &self.reporters
    }
}

impl Default for TaskReporterRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl TaskReporter for TaskReporterRegistry {
    fn report(&self, event: &TaskEvent) {
        for reporter in &self.reporters {
            reporter.report(event);
        }
    }
}
