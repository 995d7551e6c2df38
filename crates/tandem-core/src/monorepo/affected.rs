//! Affected detection against a base revision

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use tracing::{debug, instrument};

use crate::error::Result;

use super::graph::WorkspaceGraph;
use super::workspace::Workspace;

/// Version control collaborator listing changed paths
pub trait VcsDiff: Send + Sync {
    /// Paths under `scope` that differ from `base` in the repository holding `root`
    fn diff_paths(&self, root: &Path, base: &str, scope: &Path) -> Result<Vec<PathBuf>>;
}

/// Decides whether a workspace, or anything it depends on, changed since a
/// base revision.
///
/// Results are memoized per (workspace, base) for the lifetime of the
/// detector, which is one planning session.
pub struct AffectedDetector {
    vcs: Box<dyn VcsDiff>,
    cache: HashMap<(String, String), bool>,
}

/// One workspace under evaluation
struct Frame<'g> {
    ws: &'g Workspace,
    deps: Vec<&'g Workspace>,
    next: usize,
    affected: bool,
    /// Shallowest stack depth of an in-progress workspace this result skipped
    low: usize,
}

impl AffectedDetector {
    /// Create a detector with an empty cache
    pub fn new(vcs: Box<dyn VcsDiff>) -> Self {
        Self {
            vcs,
            cache: HashMap::new(),
        }
    }

    /// Memoized result, if already computed
    pub fn cached(&self, name: &str, base: &str) -> Option<bool> {
        self.cache
            .get(&(name.to_string(), base.to_string()))
            .copied()
    }

    /// Whether `ws` or any of its transitive dependencies changed since `base`.
    ///
    /// Walks the dependency closure with an explicit stack. A workspace met
    /// again while still under evaluation (a manifest cycle) counts as not
    /// affected for that edge.
    #[instrument(skip_all, fields(workspace = ws.name(), base = %base))]
    pub fn is_affected<'g>(
        &mut self,
        graph: &'g WorkspaceGraph,
        ws: &'g Workspace,
        base: &str,
    ) -> Result<bool> {
        if let Some(affected) = self.cached(ws.name(), base) {
            debug!(affected, "affected cache hit");
            return Ok(affected);
        }

        let mut in_progress: HashMap<&'g str, usize> = HashMap::new();
        let mut stack: Vec<Frame<'g>> = Vec::new();
        let mut result = false;

        self.enter(graph, ws, base, &mut stack, &mut in_progress)?;

        while let Some(frame) = stack.last_mut() {
            if !frame.affected && frame.next < frame.deps.len() {
                let dep = frame.deps[frame.next];
                frame.next += 1;

                if let Some(affected) = self.cached(dep.name(), base) {
                    frame.affected |= affected;
                } else if let Some(&depth) = in_progress.get(dep.name()) {
                    frame.low = frame.low.min(depth);
                } else {
                    self.enter(graph, dep, base, &mut stack, &mut in_progress)?;
                }
                continue;
            }

            let Some(done) = stack.pop() else { break };
            let depth = stack.len();
            in_progress.remove(done.ws.name());

            // A negative answer that leaned on an unfinished ancestor may still flip
            if done.affected || done.low >= depth {
                self.cache
                    .insert((done.ws.name().to_string(), base.to_string()), done.affected);
            }

            match stack.last_mut() {
                Some(parent) => {
                    parent.affected |= done.affected;
                    parent.low = parent.low.min(done.low);
                }
                None => result = done.affected,
            }
        }

        debug!(affected = result, "affected detection complete");
        Ok(result)
    }

    fn enter<'g>(
        &self,
        graph: &'g WorkspaceGraph,
        ws: &'g Workspace,
        base: &str,
        stack: &mut Vec<Frame<'g>>,
        in_progress: &mut HashMap<&'g str, usize>,
    ) -> Result<()> {
        let changed = self.vcs.diff_paths(graph.root(), base, &ws.root)?;
        let affected = !changed.is_empty();
        debug!(
            workspace = ws.name(),
            changed = changed.len(),
            "checked workspace for changes"
        );

        let depth = stack.len();
        in_progress.insert(ws.name(), depth);

        let deps = if affected {
            Vec::new()
        } else {
            graph.all_dependencies(ws).collect()
        };

        stack.push(Frame {
            ws,
            deps,
            next: 0,
            affected,
            low: depth,
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{TandemError, VcsError};
    use crate::monorepo::manifest::Manifest;
    use crate::monorepo::package_manager::PackageManager;
    use crate::monorepo::project::Project;
    use std::collections::HashSet;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct FakeVcs {
        changed: HashSet<PathBuf>,
        calls: Arc<AtomicUsize>,
    }

    impl FakeVcs {
        fn new(changed: &[&str]) -> (Self, Arc<AtomicUsize>) {
            let calls = Arc::new(AtomicUsize::new(0));
            let vcs = Self {
                changed: changed
                    .iter()
                    .map(|name| PathBuf::from("/project").join(name))
                    .collect(),
                calls: calls.clone(),
            };
            (vcs, calls)
        }
    }

    impl VcsDiff for FakeVcs {
        fn diff_paths(&self, _root: &Path, _base: &str, scope: &Path) -> Result<Vec<PathBuf>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.changed.contains(scope) {
                Ok(vec![scope.join("index.js")])
            } else {
                Ok(Vec::new())
            }
        }
    }

    struct NoVcs;

    impl VcsDiff for NoVcs {
        fn diff_paths(&self, root: &Path, _base: &str, _scope: &Path) -> Result<Vec<PathBuf>> {
            Err(VcsError::Unavailable(root.to_path_buf()).into())
        }
    }

    fn graph(workspaces: Vec<Manifest>) -> WorkspaceGraph {
        let project = Project::new(PathBuf::from("/project"), PackageManager::Npm);
        WorkspaceGraph::from_workspaces(
            project,
            workspaces
                .into_iter()
                .map(|m| Workspace::new(PathBuf::from("/project").join(&m.name), m))
                .collect(),
        )
    }

    fn chain() -> WorkspaceGraph {
        graph(vec![
            Manifest::new("wks-c"),
            Manifest::new("wks-b").with_dev_dependency("wks-c"),
            Manifest::new("wks-a")
                .with_dependency("wks-b")
                .with_dev_dependency("wks-c"),
            Manifest::new("wks-d"),
        ])
    }

    fn check(detector: &mut AffectedDetector, graph: &WorkspaceGraph, name: &str) -> bool {
        let ws = graph.workspace(name).unwrap();
        detector.is_affected(graph, ws, "master").unwrap()
    }

    #[test]
    fn test_direct_change() {
        let graph = chain();
        let (vcs, _) = FakeVcs::new(&["wks-d"]);
        let mut detector = AffectedDetector::new(Box::new(vcs));

        assert!(check(&mut detector, &graph, "wks-d"));
        assert!(!check(&mut detector, &graph, "wks-c"));
    }

    #[test]
    fn test_change_propagates_through_dependencies() {
        let graph = chain();
        let (vcs, _) = FakeVcs::new(&["wks-c"]);
        let mut detector = AffectedDetector::new(Box::new(vcs));

        assert!(check(&mut detector, &graph, "wks-a"));
        assert_eq!(detector.cached("wks-b", "master"), Some(true));
        assert_eq!(detector.cached("wks-c", "master"), Some(true));
        assert!(!check(&mut detector, &graph, "wks-d"));
    }

    #[test]
    fn test_results_are_memoized() {
        let graph = chain();
        let (vcs, calls) = FakeVcs::new(&[]);
        let mut detector = AffectedDetector::new(Box::new(vcs));

        assert!(!check(&mut detector, &graph, "wks-a"));
        let first = calls.load(Ordering::SeqCst);
        assert_eq!(first, 3);

        assert!(!check(&mut detector, &graph, "wks-a"));
        assert!(!check(&mut detector, &graph, "wks-b"));
        assert_eq!(calls.load(Ordering::SeqCst), first);
    }

    #[test]
    fn test_cache_is_per_base() {
        let graph = chain();
        let (vcs, calls) = FakeVcs::new(&[]);
        let mut detector = AffectedDetector::new(Box::new(vcs));
        let ws = graph.workspace("wks-c").unwrap();

        detector.is_affected(&graph, ws, "master").unwrap();
        detector.is_affected(&graph, ws, "develop").unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_cycle_terminates() {
        let graph = graph(vec![
            Manifest::new("a").with_dependency("b"),
            Manifest::new("b").with_dependency("a"),
        ]);
        let (vcs, _) = FakeVcs::new(&[]);
        let mut detector = AffectedDetector::new(Box::new(vcs));

        assert!(!check(&mut detector, &graph, "a"));
        assert_eq!(detector.cached("a", "master"), Some(false));
    }

    #[test]
    fn test_cycle_member_is_not_cached_too_early() {
        // a -> b -> a, and a -> c where c changed
        let graph = graph(vec![
            Manifest::new("a").with_dependency("b").with_dependency("c"),
            Manifest::new("b").with_dependency("a"),
            Manifest::new("c"),
        ]);
        let (vcs, _) = FakeVcs::new(&["c"]);
        let mut detector = AffectedDetector::new(Box::new(vcs));

        assert!(check(&mut detector, &graph, "a"));
        assert_eq!(detector.cached("b", "master"), None);
        assert!(check(&mut detector, &graph, "b"));
    }

    #[test]
    fn test_vcs_unavailable_is_surfaced() {
        let graph = chain();
        let mut detector = AffectedDetector::new(Box::new(NoVcs));
        let ws = graph.workspace("wks-a").unwrap();

        let err = detector.is_affected(&graph, ws, "master").unwrap_err();
        assert!(matches!(err, TandemError::Vcs(VcsError::Unavailable(_))));
    }
}
