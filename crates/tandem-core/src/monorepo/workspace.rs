//! Workspace nodes

use std::path::{Path, PathBuf};

use serde::Serialize;

use super::manifest::Manifest;

/// Version displayed for manifests that do not declare one
pub const UNVERSIONED: &str = "0.0.0";

/// One package of the monorepo: a manifest and the directory holding it
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Workspace {
    /// Absolute root directory
    pub root: PathBuf,
    /// Parsed manifest
    pub manifest: Manifest,
}

impl Workspace {
    /// Create a workspace
    pub fn new(root: impl Into<PathBuf>, manifest: Manifest) -> Self {
        Self {
            root: root.into(),
            manifest,
        }
    }

    /// Workspace name
    pub fn name(&self) -> &str {
        &self.manifest.name
    }

    /// Declared version, or `0.0.0`
    pub fn version(&self) -> &str {
        self.manifest.version.as_deref().unwrap_or(UNVERSIONED)
    }

    /// Whether the workspace is private
    pub fn is_private(&self) -> bool {
        self.manifest.private
    }

    /// Root directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Whether the manifest declares `script`
    pub fn has_script(&self, script: &str) -> bool {
        self.manifest.scripts.contains_key(script)
    }

    /// Command of `script`, if declared
    pub fn script(&self, script: &str) -> Option<&str> {
        self.manifest.scripts.get(script).map(String::as_str)
    }

    /// Names of production dependencies
    pub fn dependency_names(&self) -> impl Iterator<Item = &str> {
        self.manifest.dependencies.iter().map(String::as_str)
    }

    /// Names of dev dependencies
    pub fn dev_dependency_names(&self) -> impl Iterator<Item = &str> {
        self.manifest.dev_dependencies.iter().map(String::as_str)
    }

    /// `name@version` label
    pub fn label(&self) -> String {
        format!("{}@{}", self.name(), self.version())
    }
}
