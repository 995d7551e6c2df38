//! CLI commands

mod args;
mod completions;
mod each;
mod exec;
mod group;
mod list;
mod run;
mod tree;

pub use completions::CompletionsCommand;
pub use each::EachCommand;
pub use exec::ExecCommand;
pub use group::GroupCommand;
pub use list::ListCommand;
pub use run::RunCommand;
pub use tree::TreeCommand;
