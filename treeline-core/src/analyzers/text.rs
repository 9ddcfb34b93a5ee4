//! Fallback analyzer for files no language analyzer understands.

use super::{file_name, Analyzer};
use crate::error::Result;
use crate::node::CodeNode;
use std::path::Path;

/// Produces a single opaque File node holding the raw text.
#[derive(Debug, Default, Clone, Copy)]
pub struct TextAnalyzer;

impl TextAnalyzer {
    pub fn new() -> Self {
        Self
    }
}

impl Analyzer for TextAnalyzer {
    fn name(&self) -> &'static str {
        "text"
    }

    fn can_handle(&self, _path: &Path) -> bool {
        true
    }

    fn analyze(&self, rel_path: &str, content: &str) -> Result<Vec<CodeNode>> {
        Ok(vec![
            CodeNode::file(file_name(rel_path), rel_path).with_content(content)
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_opaque_file_node() {
        let nodes = TextAnalyzer::new().analyze("docs/guide.md", "# Guide").unwrap();
        assert_eq!(nodes.len(), 1);
        assert_eq!(nodes[0].name, "guide.md");
        assert_eq!(nodes[0].path, "docs/guide.md");
        assert!(!nodes[0].has_children());
        assert!(nodes[0].references.is_empty());
    }
}
