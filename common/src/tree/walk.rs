//! Pre-order traversals that carry each node's path

use super::{Path, TreeNode};

pub(crate) fn for_each_with_path<P, F>(nodes: &[TreeNode<P>], path: &mut Path, f: &mut F)
where
    F: FnMut(&Path, &TreeNode<P>),
{
    for node in nodes {
        path.push(node.name.clone());
        f(path, node);
        for_each_with_path(&node.children, path, f);
        path.pop();
    }
}

pub(crate) fn for_each_with_path_mut<P, F>(nodes: &mut [TreeNode<P>], path: &mut Path, f: &mut F)
where
    F: FnMut(&Path, &mut TreeNode<P>),
{
    for node in nodes {
        path.push(node.name.clone());
        f(path, node);
        for_each_with_path_mut(&mut node.children, path, f);
        path.pop();
    }
}
