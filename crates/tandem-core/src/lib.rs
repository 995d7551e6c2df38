//! Tandem Core - Workspace graph and change detection
//!
//! This crate provides the foundational types, error handling and configuration
//! for tandem, along with the monorepo model: manifests, project detection,
//! the workspace dependency graph, affected detection and workspace filters.

pub mod config;
pub mod error;
pub mod monorepo;

pub use error::{ConfigError, ManifestError, ProjectError, Result, TandemError, VcsError};
pub use monorepo::{
    AffectedDetector, FilterPipeline, Manifest, ManifestRepository, PackageManager, VcsDiff,
    Workspace, WorkspaceFilter, WorkspaceGraph,
};
