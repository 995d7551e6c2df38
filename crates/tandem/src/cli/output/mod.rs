//! Output formatting utilities

mod plan;
mod reporter;
mod table;
mod tree;

pub use plan::{print_plan, PlanMode};
pub use reporter::ConsoleReporter;
pub use table::Table;
pub use tree::render_tree;

use console::{style, Style};

/// Print a success message
pub fn success(message: &str) {
    println!("{} {}", style("✓").green().bold(), message);
}

/// Print an error message
pub fn error(message: &str) {
    eprintln!("{} {}", style("✗").red().bold(), message);
}

/// Print a warning message
pub fn warning(message: &str) {
    eprintln!("{} {}", style("!").yellow().bold(), message);
}

/// Style for paths
pub fn path_style() -> Style {
    Style::new().cyan()
}
