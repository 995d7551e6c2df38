//! `VcsDiff` backed by git

use std::path::{Path, PathBuf};

use tandem_core::monorepo::VcsDiff;

use crate::repository::GitRepo;

/// Lists changed paths by diffing the repository holding the project root
#[derive(Debug, Default, Clone, Copy)]
pub struct GitVcs;

impl VcsDiff for GitVcs {
    fn diff_paths(
        &self,
        root: &Path,
        base: &str,
        scope: &Path,
    ) -> tandem_core::Result<Vec<PathBuf>> {
        let repo = GitRepo::discover(root)?;
        Ok(repo.changed_paths(base, scope)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tandem_core::error::{TandemError, VcsError};
    use tempfile::TempDir;

    #[test]
    fn test_outside_repository_is_unavailable() {
        let temp = TempDir::new().unwrap();
        let err = GitVcs
            .diff_paths(temp.path(), "master", temp.path())
            .unwrap_err();
        assert!(matches!(err, TandemError::Vcs(VcsError::Unavailable(_))));
    }
}
