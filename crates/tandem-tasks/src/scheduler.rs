//! Task scheduler: runs a planned task set with tokio

use std::collections::HashMap;
use std::process::Stdio;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::Command;
use tokio::sync::Semaphore;
use tracing::{info, instrument};

use crate::error::ScheduleError;
use crate::plan::PlanSerializer;
use crate::reporter::{TaskEvent, TaskReporter};
use crate::task::{ScriptTask, TaskDescriptor, TaskId, TaskKind, TaskSet};

/// Result of a single task execution
#[derive(Debug, Clone)]
pub struct TaskResult {
    /// Task that was executed
    pub id: TaskId,
    /// Progress label of the task
    pub label: String,
    /// Whether the task succeeded
    pub status: TaskStatus,
    /// How long the task took
    pub duration: Duration,
    /// Captured stdout
    pub stdout: String,
    /// Captured stderr
    pub stderr: String,
}

impl TaskResult {
    fn new(task: &TaskDescriptor, status: TaskStatus, duration: Duration) -> Self {
        Self {
            id: task.id.clone(),
            label: task.label(),
            status,
            duration,
            stdout: String::new(),
            stderr: String::new(),
        }
    }
}

/// Task execution status
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskStatus {
    /// Task completed successfully
    Success,
    /// Task failed
    Failed(String),
    /// Task was skipped
    Skipped,
}

impl TaskStatus {
    /// Check if this status represents success
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success)
    }
}

/// Options for the task scheduler
#[derive(Debug, Clone)]
pub struct SchedulerOptions {
    /// Maximum concurrent processes
    pub jobs: usize,
    /// Keep running independent tasks after a failure
    pub continue_on_error: bool,
    /// Report tasks without spawning anything
    pub dry_run: bool,
}

impl Default for SchedulerOptions {
    fn default() -> Self {
        Self {
            jobs: num_cpus(),
            continue_on_error: false,
            dry_run: false,
        }
    }
}

fn num_cpus() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(4)
}

/// Executes a task set wave by wave with bounded parallelism
pub struct TaskScheduler {
    options: SchedulerOptions,
    reporter: Arc<dyn TaskReporter>,
}

impl TaskScheduler {
    /// Create a new scheduler
    pub fn new(options: SchedulerOptions, reporter: Arc<dyn TaskReporter>) -> Self {
        Self { options, reporter }
    }

    /// Execute every task reachable from `roots`, results in plan order.
    ///
    /// A task whose dependencies did not all succeed is skipped. After the
    /// first failure the remaining waves are skipped unless
    /// `continue_on_error` is set. Groups run no process and succeed as soon
    /// as their children have.
    #[instrument(skip_all, fields(roots = roots.len(), jobs = self.options.jobs))]
    pub async fn execute(
        &self,
        tasks: &TaskSet,
        roots: &[TaskId],
    ) -> Result<Vec<TaskResult>, ScheduleError> {
        let start = Instant::now();
        let ordered = PlanSerializer::order(tasks, roots)?;
        let waves = PlanSerializer::waves(&ordered);

        let semaphore = Arc::new(Semaphore::new(self.options.jobs.max(1)));
        let mut results: HashMap<TaskId, TaskResult> = HashMap::new();
        let mut failed = false;

        for (wave_idx, wave) in waves.iter().enumerate() {
            if failed && !self.options.continue_on_error {
                for id in wave {
                    if let Some(task) = tasks.get(id) {
                        self.skip(task, "a previous task failed", &mut results);
                    }
                }
                continue;
            }

            self.reporter.report(&TaskEvent::WaveStarted {
                wave: wave_idx,
                task_count: wave.len(),
            });

            let mut handles = Vec::new();

            for id in wave {
                let Some(task) = tasks.get(id) else { continue };

                if self.options.dry_run {
                    self.skip(task, "dry run", &mut results);
                    continue;
                }

                let blocked = task.dependencies.iter().any(|dep| {
                    !results
                        .get(dep)
                        .map(|r| r.status.is_success())
                        .unwrap_or(false)
                });
                if blocked {
                    self.skip(task, "a dependency did not succeed", &mut results);
                    continue;
                }

                let script = match &task.kind {
                    TaskKind::Build(script) | TaskKind::Run(script) => script.clone(),
                    TaskKind::Group(_) => {
                        self.reporter.report(&TaskEvent::Completed {
                            id: task.id.clone(),
                            label: task.label(),
                            duration: Duration::ZERO,
                        });
                        results.insert(
                            task.id.clone(),
                            TaskResult::new(task, TaskStatus::Success, Duration::ZERO),
                        );
                        continue;
                    }
                };

                let semaphore = semaphore.clone();
                let reporter = self.reporter.clone();
                let id = task.id.clone();
                let label = task.label();

                let handle = tokio::spawn(async move {
                    let _permit = semaphore.acquire_owned().await;
                    execute_script(id, label, script, &*reporter).await
                });
                handles.push((task, handle));
            }

            for (task, handle) in handles {
                let result = match handle.await {
                    Ok(result) => result,
                    Err(e) => TaskResult::new(
                        task,
                        TaskStatus::Failed(format!("Task panicked: {}", e)),
                        Duration::ZERO,
                    ),
                };
                if !result.status.is_success() {
                    failed = true;
                }
                results.insert(task.id.clone(), result);
            }
        }

        let total = results.len();
        let succeeded = results.values().filter(|r| r.status.is_success()).count();
        let failed_count = results
            .values()
            .filter(|r| matches!(r.status, TaskStatus::Failed(_)))
            .count();
        let skipped = results
            .values()
            .filter(|r| r.status == TaskStatus::Skipped)
            .count();

        self.reporter.report(&TaskEvent::AllCompleted {
            total,
            succeeded,
            failed: failed_count,
            skipped,
            duration: start.elapsed(),
        });
        info!(total, succeeded, failed = failed_count, skipped, "execution finished");

        Ok(ordered
            .iter()
            .filter_map(|task| results.remove(&task.id))
            .collect())
    }

    fn skip(&self, task: &TaskDescriptor, reason: &str, results: &mut HashMap<TaskId, TaskResult>) {
        self.reporter.report(&TaskEvent::Skipped {
            id: task.id.clone(),
            label: task.label(),
            reason: reason.to_string(),
        });
        results.insert(
            task.id.clone(),
            TaskResult::new(task, TaskStatus::Skipped, Duration::ZERO),
        );
    }
}

/// Run a script task through its package manager
async fn execute_script(
    id: TaskId,
    label: String,
    script: ScriptTask,
    reporter: &dyn TaskReporter,
) -> TaskResult {
    let start = Instant::now();

    reporter.report(&TaskEvent::Started {
        id: id.clone(),
        label: label.clone(),
        command: script.command_line(),
    });

    let outcome = run_command(&id, &label, &script, reporter).await;
    let duration = start.elapsed();

    let (status, stdout, stderr) = match outcome {
        Ok((stdout, stderr)) => {
            reporter.report(&TaskEvent::Completed {
                id: id.clone(),
                label: label.clone(),
                duration,
            });
            (TaskStatus::Success, stdout, stderr)
        }
        Err(error) => {
            reporter.report(&TaskEvent::Failed {
                id: id.clone(),
                label: label.clone(),
                duration,
                error: error.clone(),
            });
            (TaskStatus::Failed(error), String::new(), String::new())
        }
    };

    TaskResult {
        id,
        label,
        status,
        duration,
        stdout,
        stderr,
    }
}

/// Spawn the command and stream its output
async fn run_command(
    id: &TaskId,
    label: &str,
    script: &ScriptTask,
    reporter: &dyn TaskReporter,
) -> Result<(String, String), String> {
    let mut child = Command::new(&script.program)
        .args(&script.argv)
        .current_dir(&script.cwd)
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|e| format!("Failed to spawn {}: {}", script.program, e))?;

    let stdout = child.stdout.take();
    let stderr = child.stderr.take();

    let (stdout_lines, stderr_lines) = tokio::join!(
        forward_lines(stdout, id, label, false, reporter),
        forward_lines(stderr, id, label, true, reporter),
    );

    let status = child
        .wait()
        .await
        .map_err(|e| format!("Failed to wait: {}", e))?;

    if status.success() {
        Ok((stdout_lines.join("\n"), stderr_lines.join("\n")))
    } else {
        let code = status.code().unwrap_or(-1);
        Err(format!("Command exited with code {}", code))
    }
}

async fn forward_lines<R: AsyncRead + Unpin>(
    stream: Option<R>,
    id: &TaskId,
    label: &str,
    is_stderr: bool,
    reporter: &dyn TaskReporter,
) -> Vec<String> {
    let mut collected = Vec::new();
    let Some(stream) = stream else {
        return collected;
    };

    let mut lines = BufReader::new(stream).lines();
    while let Ok(Some(line)) = lines.next_line().await {
        reporter.report(&TaskEvent::Output {
            id: id.clone(),
            label: label.to_string(),
            line: line.clone(),
            is_stderr,
        });
        collected.push(line);
    }
    collected
}
