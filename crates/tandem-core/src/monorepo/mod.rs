//! Monorepo model: manifests, workspaces and their dependency graph
//!
//! This module provides:
//! - Manifest loading through a pluggable repository
//! - Project boundary and package manager detection
//! - The workspace dependency graph with lazy name resolution
//! - Affected detection against a base revision, memoized per session
//! - A predicate pipeline to narrow workspace selections

pub mod affected;
pub mod filters;
pub mod graph;
pub mod manifest;
pub mod package_manager;
pub mod project;
pub mod workspace;

pub use affected::{AffectedDetector, VcsDiff};
pub use filters::{AffectedFilter, FilterPipeline, PrivateFilter, ScriptsFilter, WorkspaceFilter};
pub use graph::WorkspaceGraph;
pub use manifest::{JsonManifestRepository, Manifest, ManifestRepository};
pub use package_manager::PackageManager;
pub use project::Project;
pub use workspace::Workspace;
