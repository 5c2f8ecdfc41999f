//! Hierarchical directory/file view of the indexed paths.

mod builder;

pub use builder::TreeBuilder;

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Kind of tree node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    Directory,
    File,
}

/// A node in the project tree. Only directories carry `children`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeNode {
    pub name: String,

    pub kind: NodeKind,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<TreeNode>>,
}

impl TreeNode {
    pub fn directory(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: NodeKind::Directory,
            children: Some(Vec::new()),
        }
    }

    pub fn file(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: NodeKind::File,
            children: None,
        }
    }

    pub fn is_directory(&self) -> bool {
        self.kind == NodeKind::Directory
    }

    pub fn children(&self) -> &[TreeNode] {
        self.children.as_deref().unwrap_or(&[])
    }

    /// Number of file nodes in this subtree.
    pub fn file_count(&self) -> usize {
        match self.kind {
            NodeKind::File => 1,
            NodeKind::Directory => self.children().iter().map(TreeNode::file_count).sum(),
        }
    }

    /// Look up a node by `/`-separated path relative to this node.
    pub fn find(&self, rel_path: &str) -> Option<&TreeNode> {
        rel_path
            .split('/')
            .filter(|s| !s.is_empty())
            .try_fold(self, |node, segment| {
                node.children().iter().find(|c| c.name == segment)
            })
    }
}

/// Name of the tree root for a project root path.
pub fn root_name(root: &Path) -> String {
    root.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| root.to_string_lossy().into_owned())
}
