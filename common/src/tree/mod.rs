//! Named trees rendered as flat, collapsible, addressable line lists.
//!
//! A [`Forest`] is an ordered set of [`TreeNode`] roots. [`TreeModel`]
//! projects it into [`FlatLine`]s with tree-art prefixes, and
//! [`TreeController`] drives a model from navigation input.
//!
//! Nodes are addressed by their [`Path`], the names from a root down to the
//! node. Names are only unique among siblings, so the path is the node's
//! identity and the key under which collapse state survives a rebuild.

pub mod controller;
pub mod model;
pub mod namespace;
mod walk;

use serde::Deserialize;

pub use controller::{ListSurface, NavInput, SurfaceLine, TreeController, TreeEvent};
pub use model::{FlatLine, TreeModel};
pub use namespace::{NamespaceBuilder, NamespaceEntry};

/// Names from a root to a node
pub type Path = Vec<String>;

#[derive(Debug, Clone, PartialEq)]
pub struct TreeNode<P> {
    pub name: String,
    pub payload: P,
    /// Only meaningful when the node has children
    pub collapsed: bool,
    children: Vec<TreeNode<P>>,
}

impl<P> TreeNode<P> {
    pub fn new(name: impl Into<String>, payload: P) -> Self {
        Self {
            name: name.into(),
            payload,
            collapsed: false,
            children: Vec::new(),
        }
    }

    /// Builder-style child insertion
    pub fn with_child(mut self, child: TreeNode<P>) -> Self {
        self.insert_child(child);
        self
    }

    pub fn children(&self) -> &[TreeNode<P>] {
        &self.children
    }

    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
    }

    pub fn child(&self, name: &str) -> Option<&TreeNode<P>> {
        self.children.iter().find(|c| c.name == name)
    }

    pub fn child_mut(&mut self, name: &str) -> Option<&mut TreeNode<P>> {
        self.children.iter_mut().find(|c| c.name == name)
    }

    /// Insert a child, replacing any sibling with the same name in place
    pub fn insert_child(&mut self, child: TreeNode<P>) -> &mut TreeNode<P> {
        insert_or_replace(&mut self.children, child)
    }

    /// Existing child by name, or a new one appended after its siblings
    pub fn child_or_insert_with(
        &mut self,
        name: &str,
        payload: impl FnOnce() -> P,
    ) -> &mut TreeNode<P> {
        get_or_insert(&mut self.children, name, payload)
    }
}

/// Ordered collection of independent roots
#[derive(Debug, Clone, PartialEq)]
pub struct Forest<P> {
    roots: Vec<TreeNode<P>>,
}

impl<P> Default for Forest<P> {
    fn default() -> Self {
        Self { roots: Vec::new() }
    }
}

impl<P> Forest<P> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn roots(&self) -> &[TreeNode<P>] {
        &self.roots
    }

    pub fn len(&self) -> usize {
        self.roots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    pub fn root(&self, name: &str) -> Option<&TreeNode<P>> {
        self.roots.iter().find(|r| r.name == name)
    }

    pub fn insert(&mut self, root: TreeNode<P>) -> &mut TreeNode<P> {
        insert_or_replace(&mut self.roots, root)
    }

    pub fn root_or_insert_with(
        &mut self,
        name: &str,
        payload: impl FnOnce() -> P,
    ) -> &mut TreeNode<P> {
        get_or_insert(&mut self.roots, name, payload)
    }

    /// Resolve a path to a node, or `None` if any segment is missing
    pub fn find(&self, path: &[String]) -> Option<&TreeNode<P>> {
        let (first, rest) = path.split_first()?;
        let mut node = self.root(first)?;
        for segment in rest {
            node = node.child(segment)?;
        }
        Some(node)
    }

    pub fn find_mut(&mut self, path: &[String]) -> Option<&mut TreeNode<P>> {
        let (first, rest) = path.split_first()?;
        let mut node = self.roots.iter_mut().find(|r| &r.name == first)?;
        for segment in rest {
            node = node.child_mut(segment)?;
        }
        Some(node)
    }
}

impl<P> FromIterator<TreeNode<P>> for Forest<P> {
    fn from_iter<I: IntoIterator<Item = TreeNode<P>>>(iter: I) -> Self {
        let mut forest = Forest::new();
        for root in iter {
            forest.insert(root);
        }
        forest
    }
}

fn insert_or_replace<P>(nodes: &mut Vec<TreeNode<P>>, node: TreeNode<P>) -> &mut TreeNode<P> {
    let index = match nodes.iter().position(|n| n.name == node.name) {
        Some(index) => {
            nodes[index] = node;
            index
        }
        None => {
            nodes.push(node);
            nodes.len() - 1
        }
    };
    &mut nodes[index]
}

fn get_or_insert<'a, P>(
    nodes: &'a mut Vec<TreeNode<P>>,
    name: &str,
    payload: impl FnOnce() -> P,
) -> &'a mut TreeNode<P> {
    let index = match nodes.iter().position(|n| n.name == name) {
        Some(index) => index,
        None => {
            nodes.push(TreeNode::new(name, payload()));
            nodes.len() - 1
        }
    };
    &mut nodes[index]
}

/// Tree-art strings used to build line prefixes
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct Connectors {
    pub sibling: String,
    pub last_sibling: String,
    pub indent: String,
    pub last_indent: String,
}

impl Default for Connectors {
    fn default() -> Self {
        Self {
            sibling: "├── ".to_string(),
            last_sibling: "└── ".to_string(),
            indent: "│   ".to_string(),
            last_indent: "    ".to_string(),
        }
    }
}

impl Connectors {
    /// No tree art at all, for plain lists
    pub fn flat() -> Self {
        Self {
            sibling: String::new(),
            last_sibling: String::new(),
            indent: String::new(),
            last_indent: String::new(),
        }
    }
}
