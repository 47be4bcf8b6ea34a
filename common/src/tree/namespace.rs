//! Slash-delimited names to a namespace forest

use tracing::debug;

use super::{Forest, TreeNode};
use crate::error::{Error, Result};

/// Payload of a namespace node
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NamespaceEntry {
    /// The node is a complete input name rather than a grouping segment
    pub real: bool,
}

impl NamespaceEntry {
    /// Rebuild the fully qualified name from a node path
    pub fn full_name(path: &[String]) -> String {
        format!("/{}", path.join("/"))
    }
}

pub struct NamespaceBuilder;

impl NamespaceBuilder {
    /// Build a forest with one node per path segment.
    ///
    /// Names are sorted and deduplicated first, so siblings come out in
    /// lexicographic order of the full names and the same input always
    /// produces the same paths.
    pub fn build<I, S>(names: I) -> Result<Forest<NamespaceEntry>>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut names: Vec<String> = names.into_iter().map(|n| n.as_ref().to_string()).collect();
        names.sort();
        names.dedup();

        let mut forest = Forest::new();
        for name in &names {
            let segments = split_name(name)?;
            let Some((first, rest)) = segments.split_first() else {
                continue;
            };

            let mut node: &mut TreeNode<NamespaceEntry> =
                forest.root_or_insert_with(first, NamespaceEntry::default);
            for segment in rest {
                node = node.child_or_insert_with(segment, NamespaceEntry::default);
            }
            node.payload.real = true;
        }

        debug!(names = names.len(), roots = forest.len(), "Built namespace forest");
        Ok(forest)
    }
}

fn split_name(name: &str) -> Result<Vec<&str>> {
    let invalid = |reason| Error::InvalidName {
        name: name.to_string(),
        reason,
    };

    let rest = name.strip_prefix('/').ok_or_else(|| invalid("must start with '/'"))?;
    if rest.is_empty() {
        return Err(invalid("has no segments"));
    }

    let segments: Vec<&str> = rest.split('/').collect();
    if segments.iter().any(|s| s.is_empty()) {
        return Err(invalid("contains an empty segment"));
    }
    Ok(segments)
}
