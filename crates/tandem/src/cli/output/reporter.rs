//! Console reporter for task execution

use console::style;

use tandem_tasks::{TaskEvent, TaskReporter};

/// Prints task progress to the terminal
pub struct ConsoleReporter {
    verbose: bool,
}

impl ConsoleReporter {
    pub fn new(verbose: bool) -> Self {
        Self { verbose }
    }
}

fn took(duration: &std::time::Duration) -> String {
    style(format!("(took {:.1}s)", duration.as_secs_f64()))
        .dim()
        .to_string()
}

impl TaskReporter for ConsoleReporter {
    fn report(&self, event: &TaskEvent) {
        match event {
            TaskEvent::Started { label, command, .. } => {
                println!(
                    "  {} {} {}",
                    style("▸").dim(),
                    style(label).bold(),
                    if self.verbose {
                        style(format!("({})", command)).dim().to_string()
                    } else {
                        String::new()
                    }
                );
            }
            TaskEvent::Output {
                label,
                line,
                is_stderr,
                ..
            } => {
                if *is_stderr {
                    eprintln!("    {} {}", style(format!("[{}]", label)).red().dim(), line);
                } else if self.verbose {
                    println!("    {} {}", style(format!("[{}]", label)).dim(), line);
                }
            }
            TaskEvent::Completed { label, duration, .. } => {
                println!("  {} {} {}", style("✓").green(), label, took(duration));
            }
            TaskEvent::Failed {
                label,
                duration,
                error,
                ..
            } => {
                println!(
                    "  {} {} {} {}",
                    style("✗").red(),
                    style(label).red(),
                    took(duration),
                    style(error).red().dim()
                );
            }
            TaskEvent::Skipped { label, reason, .. } => {
                println!(
                    "  {} {} {}",
                    style("○").yellow(),
                    style(label).yellow(),
                    style(format!("({})", reason)).dim()
                );
            }
            TaskEvent::WaveStarted { wave, task_count } => {
                if self.verbose {
                    println!(
                        "  {} Wave {} ({} tasks)",
                        style("─").dim(),
                        wave,
                        task_count
                    );
                }
            }
            TaskEvent::AllCompleted {
                total,
                succeeded,
                failed,
                skipped,
                duration,
            } => {
                println!();
                println!(
                    "  {} {}/{} succeeded, {} failed, {} skipped ({:.1}s)",
                    if *failed == 0 {
                        style("✓").green().bold()
                    } else {
                        style("✗").red().bold()
                    },
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
