//! Diff against a base revision

use std::path::{Path, PathBuf};

use git2::DiffOptions;
use tracing::debug;

use tandem_core::error::VcsError;

use crate::repository::{GitRepo, Result};

impl GitRepo {
    /// Paths under `scope` that differ between `base` and the working tree.
    ///
    /// Staged and unstaged changes to tracked files count; untracked files do
    /// not. A scope outside the working tree has no changes.
    pub fn changed_paths(&self, base: &str, scope: &Path) -> Result<Vec<PathBuf>> {
        let workdir = self
            .workdir()
            .ok_or_else(|| VcsError::Unavailable(self.path().to_path_buf()))?;

        let tree = self
            .repo
            .revparse_single(base)
            .map_err(|_| VcsError::RevisionNotFound(base.to_string()))?
            .peel_to_tree()?;

        let Some(relative) = relative_scope(workdir, scope) else {
            debug!(scope = %scope.display(), "scope outside of working tree");
            return Ok(Vec::new());
        };

        let mut opts = DiffOptions::new();
        if !relative.is_empty() {
            opts.pathspec(&relative);
        }

        let diff = self
            .repo
            .diff_tree_to_workdir_with_index(Some(&tree), Some(&mut opts))?;

        let paths: Vec<PathBuf> = diff
            .deltas()
            .filter_map(|delta| delta.new_file().path().or_else(|| delta.old_file().path()))
            .map(|path| workdir.join(path))
            .collect();

        debug!(base, scope = %relative, changed = paths.len(), "diffed against base");
        Ok(paths)
    }
}

/// `scope` relative to `workdir`, with forward slashes as git expects
fn relative_scope(workdir: &Path, scope: &Path) -> Option<String> {
    let workdir = workdir
        .canonicalize()
        .unwrap_or_else(|_| workdir.to_path_buf());
    let scope = scope.canonicalize().unwrap_or_else(|_| scope.to_path_buf());

    let relative = scope.strip_prefix(&workdir).ok()?;
    Some(relative.to_string_lossy().replace('\\', "/"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use git2::{Repository, Signature};
    use tempfile::TempDir;

    fn commit_all(repo: &Repository, message: &str) -> String {
        let sig = Signature::now("Test", "test@example.com").unwrap();
        let mut index = repo.index().unwrap();
        index
            .add_all(["*"].iter(), git2::IndexAddOption::DEFAULT, None)
            .unwrap();
        index.write().unwrap();
        let tree_id = index.write_tree().unwrap();
        let tree = repo.find_tree(tree_id).unwrap();

        let parents: Vec<git2::Commit> = repo
            .head()
            .ok()
            .and_then(|h| h.peel_to_commit().ok())
            .into_iter()
            .collect();
        let parent_refs: Vec<&git2::Commit> = parents.iter().collect();

        repo.commit(Some("HEAD"), &sig, &sig, message, &tree, &parent_refs)
            .unwrap()
            .to_string()
    }

    fn setup() -> (TempDir, String) {
        let temp = TempDir::new().unwrap();
        let repo = Repository::init(temp.path()).unwrap();

        for name in ["wks-a", "wks-b"] {
            let dir = temp.path().join("packages").join(name);
            std::fs::create_dir_all(&dir).unwrap();
            std::fs::write(dir.join("index.js"), "module.exports = 1;").unwrap();
        }

        let base = commit_all(&repo, "Initial commit");
        (temp, base)
    }

    #[test]
    fn test_modified_file_is_reported_in_scope() {
        let (temp, base) = setup();
        std::fs::write(temp.path().join("packages/wks-a/index.js"), "module.exports = 2;").unwrap();

        let repo = GitRepo::discover(temp.path()).unwrap();

        let changed = repo
            .changed_paths(&base, &temp.path().join("packages/wks-a"))
            .unwrap();
        assert_eq!(changed.len(), 1);
        assert!(changed[0].ends_with("packages/wks-a/index.js"));

        let unchanged = repo
            .changed_paths(&base, &temp.path().join("packages/wks-b"))
            .unwrap();
        assert!(unchanged.is_empty());
    }

    #[test]
    fn test_committed_change_since_base() {
        let (temp, base) = setup();
        let repo = Repository::open(temp.path()).unwrap();
        std::fs::write(temp.path().join("packages/wks-b/index.js"), "changed").unwrap();
        commit_all(&repo, "Change wks-b");

        let git = GitRepo::open(temp.path()).unwrap();
        let changed = git
            .changed_paths(&base, &temp.path().join("packages/wks-b"))
            .unwrap();
        assert_eq!(changed.len(), 1);

        let head = git.changed_paths("HEAD", &temp.path().join("packages/wks-b")).unwrap();
        assert!(head.is_empty());
    }

    #[test]
    fn test_unknown_revision() {
        let (temp, _) = setup();
        let repo = GitRepo::open(temp.path()).unwrap();

        let err = repo
            .changed_paths("does-not-exist", temp.path())
            .unwrap_err();
        assert!(matches!(err, VcsError::RevisionNotFound(_)));
    }

    #[test]
    fn test_relative_scope() {
        let root = Path::new("/project");
        assert_eq!(
            relative_scope(root, Path::new("/project/packages/a")),
            Some("packages/a".to_string())
        );
        assert_eq!(relative_scope(root, root), Some(String::new()));
        assert_eq!(relative_scope(root, Path::new("/elsewhere")), None);
    }
}
