//! Workspace filter pipeline

use tracing::debug;

use crate::error::Result;

use super::affected::AffectedDetector;
use super::graph::WorkspaceGraph;
use super::workspace::Workspace;

/// A predicate over a single workspace
pub trait WorkspaceFilter {
    /// Whether `ws` passes this filter
    fn test(&mut self, ws: &Workspace) -> Result<bool>;
}

impl<F> WorkspaceFilter for F
where
    F: FnMut(&Workspace) -> Result<bool>,
{
    fn test(&mut self, ws: &Workspace) -> Result<bool> {
        self(ws)
    }
}

/// Ordered list of filters applied to a workspace sequence
#[derive(Default)]
pub struct FilterPipeline<'a> {
    stages: Vec<Box<dyn WorkspaceFilter + 'a>>,
}

impl<'a> FilterPipeline<'a> {
    /// Create an empty pipeline, which lets everything through
    pub fn new() -> Self {
        Self { stages: Vec::new() }
    }

    /// Append a filter
    pub fn add<F: WorkspaceFilter + 'a>(&mut self, filter: F) -> &mut Self {
        self.stages.push(Box::new(filter));
        self
    }

    /// Number of registered filters
    pub fn len(&self) -> usize {
        self.stages.len()
    }

    /// Whether no filter is registered
    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    /// Lazily keep the workspaces passing every filter, in input order.
    ///
    /// Filters run in registration order and the first rejection stops the
    /// evaluation for that workspace. Errors are yielded in place.
    pub fn filter<'p, 'w, I>(&'p mut self, workspaces: I) -> Filtered<'p, 'a, I::IntoIter>
    where
        I: IntoIterator<Item = &'w Workspace>,
    {
        Filtered {
            stages: &mut self.stages,
            inner: workspaces.into_iter(),
        }
    }
}

/// Iterator returned by [`FilterPipeline::filter`]
pub struct Filtered<'p, 'a, I> {
    stages: &'p mut [Box<dyn WorkspaceFilter + 'a>],
    inner: I,
}

impl<'p, 'a, 'w, I> Iterator for Filtered<'p, 'a, I>
where
    I: Iterator<Item = &'w Workspace>,
{
    type Item = Result<&'w Workspace>;

    fn next(&mut self) -> Option<Self::Item> {
        for ws in self.inner.by_ref() {
            match passes(self.stages, ws) {
                Ok(true) => return Some(Ok(ws)),
                Ok(false) => debug!(workspace = ws.name(), "workspace filtered out"),
                Err(err) => return Some(Err(err)),
            }
        }
        None
    }
}

fn passes(stages: &mut [Box<dyn WorkspaceFilter + '_>], ws: &Workspace) -> Result<bool> {
    for stage in stages.iter_mut() {
        if !stage.test(ws)? {
            return Ok(false);
        }
    }
    Ok(true)
}

/// Keeps private (`true`) or public (`false`) workspaces
#[derive(Debug, Clone, Copy)]
pub struct PrivateFilter(pub bool);

impl WorkspaceFilter for PrivateFilter {
    fn test(&mut self, ws: &Workspace) -> Result<bool> {
        Ok(ws.is_private() == self.0)
    }
}

/// Keeps workspaces declaring at least one of the scripts
#[derive(Debug, Clone)]
pub struct ScriptsFilter(pub Vec<String>);

impl WorkspaceFilter for ScriptsFilter {
    fn test(&mut self, ws: &Workspace) -> Result<bool> {
        Ok(self.0.iter().any(|script| ws.has_script(script)))
    }
}

/// Keeps workspaces affected since a base revision
pub struct AffectedFilter<'a> {
    graph: &'a WorkspaceGraph,
    detector: &'a mut AffectedDetector,
    base: String,
}

impl<'a> AffectedFilter<'a> {
    /// Create an affected filter sharing the session's detector
    pub fn new(
        graph: &'a WorkspaceGraph,
        detector: &'a mut AffectedDetector,
        base: impl Into<String>,
    ) -> Self {
        Self {
            graph,
            detector,
            base: base.into(),
        }
    }
}

impl WorkspaceFilter for AffectedFilter<'_> {
    fn test(&mut self, ws: &Workspace) -> Result<bool> {
        // Resolve through the graph so the detector walks graph-owned nodes
        let node = self.graph.require(ws.name())?;
        self.detector.is_affected(self.graph, node, &self.base)
    }
}
