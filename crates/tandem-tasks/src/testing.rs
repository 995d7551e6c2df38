//! Shared fixtures for unit tests

use std::path::PathBuf;

use tandem_core::monorepo::Project;
use tandem_core::{Manifest, PackageManager, Workspace, WorkspaceGraph};

/// wks-c; wks-b dev-depends on wks-c; wks-a depends on wks-b and dev-depends on wks-c
pub(crate) fn fixture() -> WorkspaceGraph {
    let project = Project::new(PathBuf::from("/project"), PackageManager::Yarn);
    WorkspaceGraph::from_workspaces(
        project,
        vec![
            Workspace::new(
                "/project/wks-c",
                Manifest::new("wks-c")
                    .with_version("1.0.0")
                    .with_script("build", "tsc")
                    .with_script("start", "node ."),
            ),
            Workspace::new(
                "/project/wks-b",
                Manifest::new("wks-b")
                    .with_version("1.0.0")
                    .with_script("build", "tsc")
                    .with_script("start", "node .")
                    .with_dev_dependency("wks-c"),
            ),
            Workspace::new(
                "/project/wks-a",
                Manifest::new("wks-a")
                    .with_version("1.0.0")
                    .with_script("build", "tsc")
                    .with_script("start", "node .")
                    .with_script("lint", "eslint .")
                    .with_script("test", "jest")
                    .with_dependency("wks-b")
                    .with_dev_dependency("wks-c"),
            ),
        ],
    )
}
