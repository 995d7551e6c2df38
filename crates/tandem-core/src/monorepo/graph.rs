//! Workspace dependency graph

use std::collections::{HashMap, HashSet, VecDeque};
use std::path::{Path, PathBuf};

use glob::{glob, Pattern};
use tracing::{debug, info, instrument, warn};

use crate::error::{ProjectError, Result, TandemError};

use super::manifest::{JsonManifestRepository, ManifestRepository};
use super::package_manager::PackageManager;
use super::project::Project;
use super::workspace::Workspace;

/// All workspaces of a project, indexed by name.
///
/// Dependency edges are resolved lazily by name: a dependency name without a
/// matching workspace is an external package and is skipped.
#[derive(Debug, Clone)]
pub struct WorkspaceGraph {
    project: Project,
    /// Workspaces in discovery order
    workspaces: Vec<Workspace>,
    /// Name to position in `workspaces`
    index: HashMap<String, usize>,
}

impl WorkspaceGraph {
    /// Load the project containing `start`, reading `package.json` manifests
    pub fn load(start: &Path) -> Result<Self> {
        Self::load_with(start, &JsonManifestRepository)
    }

    /// Load the project containing `start` with the given manifest repository
    #[instrument(skip(repository), fields(start = %start.display()))]
    pub fn load_with(start: &Path, repository: &dyn ManifestRepository) -> Result<Self> {
        let project = Project::detect(start)?;
        Self::discover(project, repository)
    }

    /// Discover the workspaces of an already detected project.
    ///
    /// The root manifest comes first, then each workspaces pattern in
    /// declaration order. Invalid manifests are skipped with a warning.
    pub fn discover(project: Project, repository: &dyn ManifestRepository) -> Result<Self> {
        debug!(root = %project.root.display(), "discovering workspaces");
        let mut workspaces = Vec::new();
        let mut seen: HashSet<PathBuf> = HashSet::new();

        let patterns = match read_or_skip(repository, &project.root)? {
            Some(manifest) => {
                let patterns = manifest.workspaces.clone();
                seen.insert(project.root.clone());
                workspaces.push(Workspace::new(project.root.clone(), manifest));
                patterns
            }
            None => Vec::new(),
        };

        for pattern in &patterns {
            // The root is literal, only the workspace pattern may match
            let root = Pattern::escape(&project.root.to_string_lossy());
            let full_pattern = Path::new(&root).join(pattern).to_string_lossy().to_string();
            let entries = glob(&full_pattern).map_err(|e| ProjectError::InvalidPattern {
                pattern: pattern.clone(),
                reason: e.to_string(),
            })?;

            let mut dirs: Vec<PathBuf> = entries
                .filter_map(|entry| entry.ok())
                .filter(|path| path.is_dir())
                .collect();
            dirs.sort();

            for dir in dirs {
                if seen.contains(&dir) || !repository.has_manifest(&dir) {
                    continue;
                }
                seen.insert(dir.clone());

                if let Some(manifest) = read_or_skip(repository, &dir)? {
                    workspaces.push(Workspace::new(dir, manifest));
                }
            }
        }

        let graph = Self::from_workspaces(project, workspaces);
        info!(count = graph.len(), "discovered workspaces");
        Ok(graph)
    }

    /// Build a graph from workspaces already in memory.
    ///
    /// Workspace names are unique: a later workspace reusing a name is dropped.
    pub fn from_workspaces(project: Project, workspaces: Vec<Workspace>) -> Self {
        let mut kept = Vec::with_capacity(workspaces.len());
        let mut index = HashMap::new();

        for ws in workspaces {
            if index.contains_key(ws.name()) {
                warn!(
                    name = ws.name(),
                    root = %ws.root.display(),
                    "duplicate workspace name, keeping the first one"
                );
                continue;
            }
            index.insert(ws.name().to_string(), kept.len());
            kept.push(ws);
        }

        let graph = Self {
            project,
            workspaces: kept,
            index,
        };

        let cyclic = graph.cyclic_workspaces();
        if !cyclic.is_empty() {
            warn!(workspaces = %cyclic.join(", "), "dependency cycle between workspaces");
        }

        graph
    }

    /// Project root directory
    pub fn root(&self) -> &Path {
        &self.project.root
    }

    /// Package manager launching scripts
    pub fn package_manager(&self) -> PackageManager {
        self.project.package_manager
    }

    /// Override the package manager
    pub fn set_package_manager(&mut self, package_manager: PackageManager) {
        self.project.package_manager = package_manager;
    }

    /// Get a workspace by name
    pub fn workspace(&self, name: &str) -> Option<&Workspace> {
        self.index.get(name).map(|&i| &self.workspaces[i])
    }

    /// Get a workspace by name, failing when it is not part of the project
    pub fn require(&self, name: &str) -> Result<&Workspace> {
        self.workspace(name)
            .ok_or_else(|| ProjectError::WorkspaceNotFound(name.to_string()).into())
    }

    /// All workspaces in discovery order
    pub fn workspaces(&self) -> std::slice::Iter<'_, Workspace> {
        self.workspaces.iter()
    }

    /// Number of workspaces
    pub fn len(&self) -> usize {
        self.workspaces.len()
    }

    /// Whether the graph holds no workspace
    pub fn is_empty(&self) -> bool {
        self.workspaces.is_empty()
    }

    /// Workspaces referenced as production dependencies of `ws`
    pub fn dependencies<'a>(&'a self, ws: &'a Workspace) -> impl Iterator<Item = &'a Workspace> + 'a {
        ws.dependency_names().filter_map(|name| self.workspace(name))
    }

    /// Workspaces referenced as dev dependencies of `ws`
    pub fn dev_dependencies<'a>(
        &'a self,
        ws: &'a Workspace,
    ) -> impl Iterator<Item = &'a Workspace> + 'a {
        ws.dev_dependency_names().filter_map(|name| self.workspace(name))
    }

    /// Production then dev dependencies of `ws`
    pub fn all_dependencies<'a>(
        &'a self,
        ws: &'a Workspace,
    ) -> impl Iterator<Item = &'a Workspace> + 'a {
        self.dependencies(ws).chain(self.dev_dependencies(ws))
    }

    /// The workspace whose root is the deepest ancestor of `path`
    pub fn workspace_at(&self, path: &Path) -> Option<&Workspace> {
        let path = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());

        self.workspaces
            .iter()
            .filter(|ws| path.starts_with(&ws.root))
            .max_by_key(|ws| ws.root.components().count())
    }

    /// Resolve a workspace by name, or the one containing `cwd` when no name is given
    pub fn select(&self, name: Option<&str>, cwd: &Path) -> Result<&Workspace> {
        match name {
            Some(name) => self.require(name),
            None => self.workspace_at(cwd).ok_or_else(|| {
                TandemError::from(ProjectError::WorkspaceNotFound(cwd.display().to_string()))
            }),
        }
    }

    /// Names of workspaces involved in dependency cycles.
    ///
    /// Uses Kahn's algorithm: whatever cannot be ordered sits on a cycle or
    /// depends on one.
    pub fn cyclic_workspaces(&self) -> Vec<String> {
        let mut in_degree: Vec<usize> = vec![0; self.workspaces.len()];
        let mut dependents: Vec<Vec<usize>> = vec![Vec::new(); self.workspaces.len()];

        for (i, ws) in self.workspaces.iter().enumerate() {
            let deps: HashSet<usize> = ws
                .dependency_names()
                .chain(ws.dev_dependency_names())
                .filter_map(|name| self.index.get(name).copied())
                .collect();

            in_degree[i] = deps.len();
            for dep in deps {
                dependents[dep].push(i);
            }
        }

        let mut queue: VecDeque<usize> = in_degree
            .iter()
            .enumerate()
            .filter(|(_, degree)| **degree == 0)
            .map(|(i, _)| i)
            .collect();
        let mut ordered = 0;

        while let Some(i) = queue.pop_front() {
            ordered += 1;
            for &dependent in &dependents[i] {
                in_degree[dependent] = in_degree[dependent].saturating_sub(1);
                if in_degree[dependent] == 0 {
                    queue.push_back(dependent);
                }
            }
        }

        if ordered == self.workspaces.len() {
            return Vec::new();
        }

        in_degree
            .iter()
            .enumerate()
            .filter(|(_, degree)| **degree > 0)
            .map(|(i, _)| self.workspaces[i].name().to_string())
            .collect()
    }
}

/// Read a manifest, turning manifest errors into a skipped workspace
fn read_or_skip(
    repository: &dyn ManifestRepository,
    dir: &Path,
) -> Result<Option<super::manifest::Manifest>> {
    match repository.read_manifest(dir) {
        Ok(manifest) => Ok(Some(manifest)),
        Err(TandemError::Manifest(err)) => {
            warn!(dir = %dir.display(), error = %err, "skipping workspace with invalid manifest");
            Ok(None)
        }
        Err(err) => Err(err),
    }
}
