//! Dependency tree rendering

use tandem_core::{Workspace, WorkspaceGraph};

/// Lines of the dependency tree rooted at `ws`, dev dependencies included
pub fn render_tree(graph: &WorkspaceGraph, ws: &Workspace) -> Vec<String> {
    let mut lines = vec![ws.label()];
    let mut ancestors = vec![ws.name()];
    push_children(graph, ws, "", &mut ancestors, &mut lines);
    lines
}

fn push_children<'g>(
    graph: &'g WorkspaceGraph,
    ws: &'g Workspace,
    prefix: &str,
    ancestors: &mut Vec<&'g str>,
    lines: &mut Vec<String>,
) {
    let deps: Vec<&Workspace> = graph.all_dependencies(ws).collect();

    for (idx, dep) in deps.iter().enumerate() {
        let (branch, indent) = if idx + 1 == deps.len() {
            ("└─ ", "   ")
        } else {
            ("├─ ", "│  ")
        };

        // Cycles are shown once, not expanded
        if ancestors.contains(&dep.name()) {
            lines.push(format!("{}{}{} (cycle)", prefix, branch, dep.label()));
            continue;
        }

        lines.push(format!("{}{}{}", prefix, branch, dep.label()));
        ancestors.push(dep.name());
        push_children(graph, dep, &format!("{}{}", prefix, indent), ancestors, lines);
        ancestors.pop();
    }
}
