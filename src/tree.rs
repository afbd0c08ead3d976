//! The directory tree recorded by the walker and its rendered form.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub const STRUCTURE_HEADER: &str = "Directory Structure:\n====================\n";
const INDENT: &str = "  ";
const DIR_MARKER: &str = "📁 ";
const FILE_MARKER: &str = "📄 ";

/// A directory or file seen during the walk.
///
/// Children are kept in traversal order, which is sorted by name. Excluded
/// files stay in the tree with `excluded` set; excluded directories are pruned
/// and never appear.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeNode {
    pub name: String,
    /// `/`-separated path relative to the root; empty for the root itself.
    pub relative_path: String,
    pub path: PathBuf,
    pub is_dir: bool,
    pub excluded: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<TreeNode>,
}

impl TreeNode {
    pub fn dir(name: impl Into<String>, relative_path: impl Into<String>, path: PathBuf) -> Self {
        Self {
            name: name.into(),
            relative_path: relative_path.into(),
            path,
            is_dir: true,
            excluded: false,
            children: Vec::new(),
        }
    }

    pub fn file(
        name: impl Into<String>,
        relative_path: impl Into<String>,
        path: PathBuf,
        excluded: bool,
    ) -> Self {
        Self {
            name: name.into(),
            relative_path: relative_path.into(),
            path,
            is_dir: false,
            excluded,
            children: Vec::new(),
        }
    }

    /// Number of non-excluded files in this subtree.
    pub fn file_count(&self) -> usize {
        if self.is_dir {
            self.children.iter().map(TreeNode::file_count).sum()
        } else {
            usize::from(!self.excluded)
        }
    }
}

/// Renders the structure block that may lead the first document.
///
/// Every non-excluded entry below the root gets one line, indented two spaces
/// per level, with a folder or page marker before its name. The block ends
/// with a blank line so file sections can follow directly.
pub fn render_structure(root: &TreeNode) -> String {
    let mut out = String::with_capacity(256);
    out.push_str(STRUCTURE_HEADER);
    let mut lines = Vec::new();
    for child in &root.children {
        collect_lines(child, 0, &mut lines);
    }
    out.push_str(&lines.join("\n"));
    out.push_str("\n\n");
    out
}

fn collect_lines(node: &TreeNode, depth: usize, lines: &mut Vec<String>) {
    if node.excluded {
        return;
    }
    let marker = if node.is_dir { DIR_MARKER } else { FILE_MARKER };
    lines.push(format!("{}{}{}", INDENT.repeat(depth), marker, node.name));
    for child in &node.children {
        collect_lines(child, depth + 1, lines);
    }
}
