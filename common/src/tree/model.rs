//! Flattening and collapse state for a forest shown as indented lines

use std::collections::HashSet;

use super::walk::{for_each_with_path, for_each_with_path_mut};
use super::{Connectors, Forest, Path, TreeNode};

/// One display line produced by [`TreeModel::flatten`].
///
/// Everything here is derived; lines are rebuilt on every flatten and never
/// written back into the forest.
#[derive(Debug, Clone, PartialEq)]
pub struct FlatLine<P> {
    pub prefix: String,
    pub label: String,
    pub path: Path,
    pub depth: usize,
    pub has_children: bool,
    pub collapsed: bool,
    pub payload: P,
}

impl<P> FlatLine<P> {
    pub fn text(&self) -> String {
        format!("{}{}", self.prefix, self.label)
    }
}

/// A forest plus the connectors used to draw it
#[derive(Debug, Clone)]
pub struct TreeModel<P> {
    forest: Forest<P>,
    connectors: Connectors,
}

impl<P> TreeModel<P> {
    pub fn new(forest: Forest<P>) -> Self {
        Self {
            forest,
            connectors: Connectors::default(),
        }
    }

    pub fn with_connectors(mut self, connectors: Connectors) -> Self {
        self.connectors = connectors;
        self
    }

    pub fn forest(&self) -> &Forest<P> {
        &self.forest
    }

    pub fn connectors(&self) -> &Connectors {
        &self.connectors
    }

    pub fn find(&self, path: &[String]) -> Option<&TreeNode<P>> {
        self.forest.find(path)
    }

    /// Flip the collapse flag of the node at `path`.
    ///
    /// Returns the new flag, or `None` when the path no longer resolves or
    /// the node has nothing to hide. A miss is expected when a toggle races
    /// a rebuild and is not an error.
    pub fn toggle(&mut self, path: &[String]) -> Option<bool> {
        let node = self.forest.find_mut(path)?;
        if !node.has_children() {
            return None;
        }
        node.collapsed = !node.collapsed;
        Some(node.collapsed)
    }

    /// Every node path in pre-order, regardless of collapse state
    pub fn paths(&self) -> Vec<Path> {
        let mut paths = Vec::new();
        for_each_with_path(self.forest.roots(), &mut Vec::new(), &mut |path, _| {
            paths.push(path.clone())
        });
        paths
    }

    pub fn collapsed_paths(&self) -> HashSet<Path> {
        let mut collapsed = HashSet::new();
        for_each_with_path(self.forest.roots(), &mut Vec::new(), &mut |path, node| {
            if node.collapsed && node.has_children() {
                collapsed.insert(path.clone());
            }
        });
        collapsed
    }

    /// Set collapse flags from a path-keyed set; nodes absent from it expand
    pub fn restore_collapsed(&mut self, collapsed: &HashSet<Path>) {
        for_each_with_path_mut(&mut self.forest.roots, &mut Vec::new(), &mut |path, node| {
            node.collapsed = node.has_children() && collapsed.contains(path);
        });
    }

    /// Swap in a freshly built forest, keeping collapse state for every path
    /// that still exists
    pub fn replace_forest(&mut self, forest: Forest<P>) {
        let collapsed = self.collapsed_paths();
        self.forest = forest;
        self.restore_collapsed(&collapsed);
    }
}

impl<P: Clone> TreeModel<P> {
    /// Flatten with node names as labels
    pub fn flatten(&self) -> Vec<FlatLine<P>> {
        self.flatten_with(|node| node.name.clone())
    }

    /// Depth-first, pre-order projection of the visible nodes. Children of
    /// a collapsed node are skipped; the node itself is always emitted.
    pub fn flatten_with<F>(&self, render: F) -> Vec<FlatLine<P>>
    where
        F: Fn(&TreeNode<P>) -> String,
    {
        let mut lines = Vec::new();
        self.flatten_level(
            self.forest.roots(),
            "",
            &mut Vec::new(),
            &render,
            &mut lines,
        );
        lines
    }

    fn flatten_level<F>(
        &self,
        nodes: &[TreeNode<P>],
        indent: &str,
        path: &mut Path,
        render: &F,
        lines: &mut Vec<FlatLine<P>>,
    ) where
        F: Fn(&TreeNode<P>) -> String,
    {
        let connectors = &self.connectors;
        let last = nodes.len().saturating_sub(1);

        for (index, node) in nodes.iter().enumerate() {
            let is_last = index == last;
            let connector = if is_last {
                &connectors.last_sibling
            } else {
                &connectors.sibling
            };

            path.push(node.name.clone());
            lines.push(FlatLine {
                prefix: format!("{indent}{connector}"),
                label: render(node),
                path: path.clone(),
                depth: path.len() - 1,
                has_children: node.has_children(),
                collapsed: node.collapsed && node.has_children(),
                payload: node.payload.clone(),
            });

            if node.has_children() && !node.collapsed {
                let child_indent = if is_last {
                    &connectors.last_indent
                } else {
                    &connectors.indent
                };
                self.flatten_level(
                    node.children(),
                    &format!("{indent}{child_indent}"),
                    path,
                    render,
                    lines,
                );
            }
            path.pop();
        }
    }
}
