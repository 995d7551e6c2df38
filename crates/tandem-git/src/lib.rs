//! Tandem Git - Git operations for change detection
//!
//! This crate opens git repositories and lists the paths that differ from a
//! base revision, backing the core's affected detection.

mod diff;
mod repository;
mod vcs;

pub use repository::{GitRepo, Result};
pub use vcs::GitVcs;
