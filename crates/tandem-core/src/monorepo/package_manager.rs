//! Package manager resolution
//!
//! The package manager only decides which launcher runs a workspace script.

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

/// Package manager used to launch workspace scripts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PackageManager {
    /// npm
    #[default]
    Npm,
    /// Yarn (classic or berry)
    Yarn,
    /// pnpm
    Pnpm,
}

impl PackageManager {
    /// Lock file identifying this package manager
    pub fn lock_file(&self) -> &'static str {
        match self {
            Self::Npm => "package-lock.json",
            Self::Yarn => "yarn.lock",
            Self::Pnpm => "pnpm-lock.yaml",
        }
    }

    /// All known lock files, in detection priority order
    pub fn lock_files() -> [&'static str; 3] {
        [
            Self::Yarn.lock_file(),
            Self::Pnpm.lock_file(),
            Self::Npm.lock_file(),
        ]
    }

    /// Detect the package manager of a project from its lock files.
    ///
    /// Falls back to npm when no lock file is present.
    pub fn for_project(root: &Path) -> Self {
        let detected = [Self::Yarn, Self::Pnpm, Self::Npm]
            .into_iter()
            .find(|pm| root.join(pm.lock_file()).exists())
            .unwrap_or_default();

        debug!(root = %root.display(), package_manager = %detected, "resolved package manager");
        detected
    }

    /// Executable launching scripts
    pub fn program(&self) -> &'static str {
        match self {
            Self::Npm => "npm",
            Self::Yarn => "yarn",
            Self::Pnpm => "pnpm",
        }
    }

    /// Build the launcher argv running `script` with `args`
    pub fn command_for(&self, script: &str, args: &[String]) -> (String, Vec<String>) {
        let mut argv = vec!["run".to_string(), script.to_string()];

        if !args.is_empty() {
            // npm swallows script arguments without the separator
            if *self == Self::Npm {
                argv.push("--".to_string());
            }
            argv.extend(args.iter().cloned());
        }

        (self.program().to_string(), argv)
    }

    /// Build the argv running an arbitrary `command` inside the project.
    ///
    /// Yarn and pnpm launch it through their `exec` subcommand so project
    /// binaries resolve; npm runs it directly.
    pub fn exec_for(&self, command: &str, args: &[String]) -> (String, Vec<String>) {
        match self {
            Self::Npm => (command.to_string(), args.to_vec()),
            Self::Yarn | Self::Pnpm => {
                let mut argv = vec!["exec".to_string(), command.to_string()];
                argv.extend(args.iter().cloned());
                (self.program().to_string(), argv)
            }
        }
    }
}

impl fmt::Display for PackageManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.program())
    }
}
