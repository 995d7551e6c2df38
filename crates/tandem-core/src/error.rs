//! Error types for tandem

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using TandemError
pub type Result<T> = std::result::Result<T, TandemError>;

/// Main error type for tandem operations
#[derive(Debug, Error)]
pub enum TandemError {
    /// Configuration-related errors
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Project and workspace lookup errors
    #[error(transparent)]
    Project(#[from] ProjectError),

    /// Manifest-related errors
    #[error(transparent)]
    Manifest(#[from] ManifestError),

    /// Version control errors
    #[error(transparent)]
    Vcs(#[from] VcsError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-related errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Configuration file not found
    #[error("Configuration file not found at {0}")]
    NotFound(PathBuf),

    /// Failed to parse configuration
    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    /// Invalid configuration value
    #[error("Invalid configuration: {field} - {message}")]
    InvalidValue { field: String, message: String },

    /// YAML parsing error
    #[error("YAML parsing error: {0}")]
    YamlError(#[from] serde_yaml::Error),

    /// TOML parsing error
    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    /// IO error
    #[error("IO error reading config: {0}")]
    Io(#[from] std::io::Error),
}

/// Project and workspace lookup errors
#[derive(Debug, Error)]
pub enum ProjectError {
    /// No project boundary above the given directory
    #[error("No project found above {0}")]
    ProjectNotFound(PathBuf),

    /// Named workspace is not part of the project
    #[error("Workspace '{0}' not found")]
    WorkspaceNotFound(String),

    /// Invalid workspaces glob pattern
    #[error("Invalid workspaces pattern '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },
}

/// Manifest-related errors
#[derive(Debug, Error)]
pub enum ManifestError {
    /// Manifest file not found
    #[error("Manifest not found at {0}")]
    NotFound(PathBuf),

    /// Manifest could not be parsed or is missing required fields
    #[error("Invalid manifest {path}: {reason}")]
    Invalid { path: PathBuf, reason: String },
}

/// Version control errors
#[derive(Debug, Error)]
pub enum VcsError {
    /// The tree is not under version control
    #[error("Not under version control: {0}")]
    Unavailable(PathBuf),

    /// Base revision could not be resolved
    #[error("Revision not found: {0}")]
    RevisionNotFound(String),

    /// Git2 library error
    #[error("Git error: {0}")]
    Git2(#[from] git2::Error),
}
