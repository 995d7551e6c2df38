//! Configuration types

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::monorepo::PackageManager;

use super::defaults::{default_jobs, DEFAULT_AFFECTED_BASE, DEFAULT_BUILD_SCRIPT};

/// Main configuration for tandem
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Maximum number of tasks running at once
    pub jobs: usize,

    /// Script used to build a workspace before its dependents run
    pub build_script: String,

    /// Default dependency build mode
    pub deps_mode: BuildDepsMode,

    /// Affected detection configuration
    pub affected: AffectedConfig,

    /// Force a package manager instead of detecting it from lock files
    pub package_manager: Option<PackageManager>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            jobs: default_jobs(),
            build_script: DEFAULT_BUILD_SCRIPT.to_string(),
            deps_mode: BuildDepsMode::default(),
            affected: AffectedConfig::default(),
            package_manager: None,
        }
    }
}

/// Affected detection configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AffectedConfig {
    /// Revision compared against when no base is given
    pub base: String,
}

impl Default for AffectedConfig {
    fn default() -> Self {
        Self {
            base: DEFAULT_AFFECTED_BASE.to_string(),
        }
    }
}

/// Which dependency classes must be built before running a script
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BuildDepsMode {
    /// Production and dev dependencies
    #[default]
    All,
    /// Production dependencies only
    Prod,
    /// Nothing is built
    None,
}

impl BuildDepsMode {
    /// Whether production dependencies are built
    pub fn includes_prod(&self) -> bool {
        !matches!(self, Self::None)
    }

    /// Whether dev dependencies are built
    pub fn includes_dev(&self) -> bool {
        matches!(self, Self::All)
    }
}

impl fmt::Display for BuildDepsMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => write!(f, "all"),
            Self::Prod => write!(f, "prod"),
            Self::None => write!(f, "none"),
        }
    }
}

impl FromStr for BuildDepsMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "all" => Ok(Self::All),
            "prod" => Ok(Self::Prod),
            "none" => Ok(Self::None),
            other => Err(format!("unknown dependency mode '{}' (expected all, prod or none)", other)),
        }
    }
}
