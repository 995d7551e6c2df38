//! Project boundary detection

use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::{debug, info};

use crate::error::{ProjectError, Result};

use super::manifest::MANIFEST_FILE;
use super::package_manager::PackageManager;

/// A detected monorepo project
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Project {
    /// Project root directory
    pub root: PathBuf,
    /// Package manager launching scripts
    pub package_manager: PackageManager,
}

impl Project {
    /// Create a project rooted at `root`
    pub fn new(root: PathBuf, package_manager: PackageManager) -> Self {
        Self {
            root,
            package_manager,
        }
    }

    /// Find the project boundary at or above `start`.
    ///
    /// The nearest directory holding a lock file, or a manifest declaring
    /// workspaces, is the project root.
    pub fn detect(start: &Path) -> Result<Self> {
        debug!(start = %start.display(), "searching for project root");
        let start = start
            .canonicalize()
            .map_err(|_| ProjectError::ProjectNotFound(start.to_path_buf()))?;
        let mut current = start.clone();

        loop {
            if Self::is_boundary(&current) {
                let package_manager = PackageManager::for_project(&current);
                info!(root = %current.display(), %package_manager, "project detected");
                return Ok(Self::new(current, package_manager));
            }

            if !current.pop() {
                break;
            }
        }

        Err(ProjectError::ProjectNotFound(start).into())
    }

    fn is_boundary(dir: &Path) -> bool {
        if PackageManager::lock_files()
            .iter()
            .any(|lock| dir.join(lock).exists())
        {
            return true;
        }

        let manifest = dir.join(MANIFEST_FILE);
        if !manifest.is_file() {
            return false;
        }

        #[derive(Deserialize)]
        struct PackageJson {
            workspaces: Option<serde_json::Value>,
        }

        std::fs::read_to_string(&manifest)
            .ok()
            .and_then(|content| serde_json::from_str::<PackageJson>(&content).ok())
            .is_some_and(|pkg| pkg.workspaces.is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TandemError;
    use tempfile::TempDir;

    #[test]
    fn test_detect_from_nested_directory() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join("yarn.lock"), "").unwrap();
        let nested = temp.path().join("packages").join("wks-a").join("src");
        std::fs::create_dir_all(&nested).unwrap();

        let project = Project::detect(&nested).unwrap();
        assert_eq!(project.root, temp.path().canonicalize().unwrap());
        assert_eq!(project.package_manager, PackageManager::Yarn);
    }

    #[test]
    fn test_detect_by_workspaces_field() {
        let temp = TempDir::new().unwrap();
        std::fs::write(
            temp.path().join("package.json"),
            r#"{ "name": "main", "workspaces": ["packages/*"] }"#,
        )
        .unwrap();

        let project = Project::detect(temp.path()).unwrap();
        assert_eq!(project.root, temp.path().canonicalize().unwrap());
        assert_eq!(project.package_manager, PackageManager::Npm);
    }

    #[test]
    fn test_project_not_found() {
        let temp = TempDir::new().unwrap();
        let missing = temp.path().join("does-not-exist");

        let err = Project::detect(&missing).unwrap_err();
        assert!(matches!(
            err,
            TandemError::Project(ProjectError::ProjectNotFound(_))
        ));
    }
}
