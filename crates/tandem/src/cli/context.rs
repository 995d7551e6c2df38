//! Project state shared by commands

use std::path::{Path, PathBuf};

use tracing::{debug, info};

use tandem_core::config::{load_config_or_default, BuildDepsMode, Config};
use tandem_core::{Workspace, WorkspaceGraph};

use crate::cli::Cli;

/// Loaded configuration and workspace graph
pub struct ProjectContext {
    pub cwd: PathBuf,
    pub config: Config,
    pub graph: WorkspaceGraph,
}

impl ProjectContext {
    /// Load the project containing the current directory
    pub fn load() -> anyhow::Result<Self> {
        let cwd = std::env::current_dir()?;
        Self::load_from(&cwd)
    }

    /// Load the project containing `cwd`
    pub fn load_from(cwd: &Path) -> anyhow::Result<Self> {
        let (config, config_path) = load_config_or_default(cwd)?;
        if let Some(path) = &config_path {
            debug!(path = %path.display(), "loaded config");
        }

        let mut graph = WorkspaceGraph::load(cwd)?;
        if let Some(package_manager) = config.package_manager {
            graph.set_package_manager(package_manager);
        }

        info!(
            root = %graph.root().display(),
            workspaces = graph.len(),
            package_manager = %graph.package_manager(),
            "project loaded"
        );

        Ok(Self {
            cwd: cwd.to_path_buf(),
            config,
            graph,
        })
    }

    /// Named workspace, or the one containing the working directory
    pub fn workspace(&self, name: Option<&str>) -> anyhow::Result<&Workspace> {
        Ok(self.graph.select(name, &self.cwd)?)
    }

    /// Dependency mode from the command line, falling back to config
    pub fn deps_mode(&self, flag: Option<BuildDepsMode>) -> BuildDepsMode {
        flag.unwrap_or(self.config.deps_mode)
    }

    /// Parallelism from the command line, falling back to config
    pub fn jobs(&self, cli: &Cli) -> usize {
        cli.jobs.unwrap_or(self.config.jobs).max(1)
    }
}
