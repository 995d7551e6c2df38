//! Workspace manifests (`package.json`)

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{ManifestError, Result};

/// Manifest file name read by [`JsonManifestRepository`]
pub const MANIFEST_FILE: &str = "package.json";

/// Descriptor of a workspace
///
/// Dependency lists only carry names: they are used as graph edge keys and
/// never resolved against a registry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manifest {
    /// Package name, unique within a project
    pub name: String,
    /// Package version, if declared
    pub version: Option<String>,
    /// Whether the package is private
    pub private: bool,
    /// Scripts by name
    pub scripts: BTreeMap<String, String>,
    /// Production dependency names
    pub dependencies: Vec<String>,
    /// Dev dependency names
    pub dev_dependencies: Vec<String>,
    /// Workspace glob patterns (project root only)
    pub workspaces: Vec<String>,
}

impl Manifest {
    /// Create a manifest with only a name
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Set the version
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    /// Mark as private
    pub fn with_private(mut self, private: bool) -> Self {
        self.private = private;
        self
    }

    /// Add a script
    pub fn with_script(mut self, name: impl Into<String>, command: impl Into<String>) -> Self {
        self.scripts.insert(name.into(), command.into());
        self
    }

    /// Add a production dependency
    pub fn with_dependency(mut self, name: impl Into<String>) -> Self {
        self.dependencies.push(name.into());
        self
    }

    /// Add a dev dependency
    pub fn with_dev_dependency(mut self, name: impl Into<String>) -> Self {
        self.dev_dependencies.push(name.into());
        self
    }

    /// Add a workspaces pattern
    pub fn with_workspaces(mut self, pattern: impl Into<String>) -> Self {
        self.workspaces.push(pattern.into());
        self
    }
}

/// Loads manifests from disk
pub trait ManifestRepository: Send + Sync {
    /// Manifest file name looked up in each workspace directory
    fn manifest_file(&self) -> &'static str;

    /// Read the manifest of the workspace rooted at `dir`
    fn read_manifest(&self, dir: &Path) -> Result<Manifest>;

    /// Whether `dir` holds a manifest
    fn has_manifest(&self, dir: &Path) -> bool {
        dir.join(self.manifest_file()).is_file()
    }
}

/// Reads npm-style `package.json` manifests
#[derive(Debug, Default, Clone, Copy)]
pub struct JsonManifestRepository;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PackageJson {
    name: Option<String>,
    version: Option<String>,
    private: Option<bool>,
    #[serde(default)]
    scripts: BTreeMap<String, String>,
    #[serde(default)]
    dependencies: BTreeMap<String, serde_json::Value>,
    #[serde(default)]
    dev_dependencies: BTreeMap<String, serde_json::Value>,
    workspaces: Option<WorkspacesField>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum WorkspacesField {
    Array(Vec<String>),
    Object {
        #[serde(default)]
        packages: Vec<String>,
    },
}

impl ManifestRepository for JsonManifestRepository {
    fn manifest_file(&self) -> &'static str {
        MANIFEST_FILE
    }

    fn read_manifest(&self, dir: &Path) -> Result<Manifest> {
        let path = dir.join(MANIFEST_FILE);
        debug!(path = %path.display(), "reading manifest");

        let content = std::fs::read_to_string(&path)
            .map_err(|_| ManifestError::NotFound(path.clone()))?;

        let pkg: PackageJson =
            serde_json::from_str(&content).map_err(|e| invalid(&path, e.to_string()))?;

        let name = match pkg.name {
            Some(name) if !name.trim().is_empty() => name,
            _ => return Err(invalid(&path, "missing package name".to_string())),
        };

        let workspaces = match pkg.workspaces {
            Some(WorkspacesField::Array(patterns)) => patterns,
            Some(WorkspacesField::Object { packages }) => packages,
            None => Vec::new(),
        };

        Ok(Manifest {
            name,
            version: pkg.version,
            private: pkg.private.unwrap_or(false),
            scripts: pkg.scripts,
            dependencies: pkg.dependencies.into_keys().collect(),
            dev_dependencies: pkg.dev_dependencies.into_keys().collect(),
            workspaces,
        })
    }
}

fn invalid(path: &Path, reason: String) -> crate::error::TandemError {
    ManifestError::Invalid {
        path: path.to_path_buf(),
        reason,
    }
    .into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TandemError;
    use tempfile::TempDir;

    #[test]
    fn test_read_full_manifest() {
        let temp = TempDir::new().unwrap();
        std::fs::write(
            temp.path().join("package.json"),
            r#"{
                "name": "wks-a",
                "version": "1.2.3",
                "private": true,
                "scripts": { "build": "tsc", "test": "jest" },
                "dependencies": { "wks-b": "^1.0.0", "lodash": "^4.0.0" },
                "devDependencies": { "wks-c": "workspace:*" }
            }"#,
        )
        .unwrap();

        let manifest = JsonManifestRepository.read_manifest(temp.path()).unwrap();
        assert_eq!(manifest.name, "wks-a");
        assert_eq!(manifest.version.as_deref(), Some("1.2.3"));
        assert!(manifest.private);
        assert_eq!(manifest.scripts.get("build").map(String::as_str), Some("tsc"));
        assert_eq!(manifest.dependencies, vec!["lodash", "wks-b"]);
        assert_eq!(manifest.dev_dependencies, vec!["wks-c"]);
        assert!(manifest.workspaces.is_empty());
    }

    #[test]
    fn test_read_workspaces_object_form() {
        let temp = TempDir::new().unwrap();
        std::fs::write(
            temp.path().join("package.json"),
            r#"{ "name": "root", "workspaces": { "packages": ["packages/*"] } }"#,
        )
        .unwrap();

        let manifest = JsonManifestRepository.read_manifest(temp.path()).unwrap();
        assert_eq!(manifest.workspaces, vec!["packages/*"]);
        assert!(manifest.version.is_none());
    }

    #[test]
    fn test_missing_manifest() {
        let temp = TempDir::new().unwrap();
        let err = JsonManifestRepository.read_manifest(temp.path()).unwrap_err();
        assert!(matches!(err, TandemError::Manifest(ManifestError::NotFound(_))));
    }

    #[test]
    fn test_manifest_without_name_is_invalid() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join("package.json"), r#"{ "version": "1.0.0" }"#).unwrap();

        let err = JsonManifestRepository.read_manifest(temp.path()).unwrap_err();
        assert!(matches!(err, TandemError::Manifest(ManifestError::Invalid { .. })));
    }

    #[test]
    fn test_malformed_json_is_invalid() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join("package.json"), "{ not json").unwrap();

        let err = JsonManifestRepository.read_manifest(temp.path()).unwrap_err();
        assert!(matches!(err, TandemError::Manifest(ManifestError::Invalid { .. })));
    }
}
