//! Tree assembly.
//!
//! Analyzers produce one subtree per file. The assembler merges those into a
//! single repository-rooted tree, creating directory nodes for every path
//! segment on the way down.

use crate::node::CodeNode;
use tracing::trace;

/// Path of the repository root node.
pub const ROOT_PATH: &str = ".";

/// Merges per-file node lists into one tree keyed by path segments.
#[derive(Debug, Clone)]
pub struct TreeAssembler {
    root: CodeNode,
}

impl TreeAssembler {
    /// Starts a tree whose root directory is displayed as `root_name`.
    pub fn new(root_name: impl Into<String>) -> Self {
        Self {
            root: CodeNode::directory(root_name, ROOT_PATH),
        }
    }

    /// Adds the analyzed nodes of the file at `rel_path` (`/`-separated).
    ///
    /// Missing parent directories are created. A node whose name matches an
    /// existing sibling replaces it.
    pub fn add_file(&mut self, rel_path: &str, nodes: Vec<CodeNode>) {
        let segments: Vec<&str> = rel_path
            .split('/')
            .filter(|s| !s.is_empty() && *s != ".")
            .collect();
        let Some((_, parents)) = segments.split_last() else {
            return;
        };

        let mut current = &mut self.root;
        let mut prefix = String::new();
        for part in parents {
            if !prefix.is_empty() {
                prefix.push('/');
            }
            prefix.push_str(part);

            if current.child(part).is_none() {
                trace!(path = %prefix, "creating directory node");
                current.insert_child(CodeNode::directory(*part, prefix.clone()));
            }
            current = match current.child_mut(part) {
                Some(child) => child,
                None => return,
            };
        }

        for node in nodes {
            current.insert_child(node);
        }
    }

    /// Returns the assembled tree.
    pub fn finish(self) -> CodeNode {
        self.root
    }
}
