//! The code node model.
//!
//! A repository is represented as a strict ownership tree of `CodeNode`s:
//! directories own files, files own top-level symbols, classes own their
//! methods. Every node carries a `path` that is unique within the tree and
//! serves as its identity everywhere else (graph vertices, score lookups).

use serde::{Deserialize, Serialize};
use std::fmt;

/// Separator between a file path and a qualified symbol name.
pub const SYMBOL_SEPARATOR: &str = "::";

/// What a node represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    Directory,
    File,
    Class,
    Function,
    Method,
    Variable,
}

impl NodeKind {
    /// Directories and files are the structural scaffolding of the tree.
    pub fn is_structural(&self) -> bool {
        matches!(self, Self::Directory | Self::File)
    }

    /// Returns true for code symbols (everything below file level).
    pub fn is_symbol(&self) -> bool {
        !self.is_structural()
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Directory => "directory",
            Self::File => "file",
            Self::Class => "class",
            Self::Function => "function",
            Self::Method => "method",
            Self::Variable => "variable",
        };
        write!(f, "{}", s)
    }
}

/// A textual mention of `name` inside the node at `path`.
///
/// References are unresolved when collected. The graph builder decides
/// which node, if any, a name points to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Reference {
    /// The referenced name as written (last segment for attributes).
    pub name: String,
    /// Path of the node whose code contains the mention.
    pub path: String,
    /// 1-based line.
    pub line: u32,
    /// 0-based column.
    pub column: u32,
}

impl Reference {
    pub fn new(name: impl Into<String>, path: impl Into<String>, line: u32, column: u32) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            line,
            column,
        }
    }
}

/// A node in the repository tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CodeNode {
    /// Local display name (`utils.py`, `UserService`, `validate`).
    pub name: String,

    pub kind: NodeKind,

    /// Unique identifier within the repository.
    pub path: String,

    /// Documentation text, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub docstring: Option<String>,

    /// One-line declaration (`def run(self, n: int) -> bool`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub signature: Option<String>,

    /// Full source text.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,

    /// Owned children in insertion order. Names are unique among siblings.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    children: Vec<CodeNode>,

    /// Names this node's own code mentions.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub references: Vec<Reference>,
}

impl CodeNode {
    /// Creates a new node with no payloads and no children.
    pub fn new(name: impl Into<String>, kind: NodeKind, path: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind,
            path: path.into(),
            docstring: None,
            signature: None,
            content: None,
            children: Vec::new(),
            references: Vec::new(),
        }
    }

    pub fn directory(name: impl Into<String>, path: impl Into<String>) -> Self {
        Self::new(name, NodeKind::Directory, path)
    }

    pub fn file(name: impl Into<String>, path: impl Into<String>) -> Self {
        Self::new(name, NodeKind::File, path)
    }

    /// Creates a symbol node whose path is `<file_path>::<qualified>`.
    pub fn symbol(
        name: impl Into<String>,
        kind: NodeKind,
        file_path: &str,
        qualified: &str,
    ) -> Self {
        Self::new(name, kind, symbol_path(file_path, qualified))
    }

    pub fn with_signature(mut self, signature: impl Into<String>) -> Self {
        self.signature = Some(signature.into());
        self
    }

    pub fn with_docstring(mut self, docstring: impl Into<String>) -> Self {
        self.docstring = Some(docstring.into());
        self
    }

    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = Some(content.into());
        self
    }

    pub fn with_references(mut self, references: Vec<Reference>) -> Self {
        self.references = references;
        self
    }

    pub fn with_child(mut self, child: CodeNode) -> Self {
        self.insert_child(child);
        self
    }

    pub fn with_children(mut self, children: impl IntoIterator<Item = CodeNode>) -> Self {
        for child in children {
            self.insert_child(child);
        }
        self
    }

    /// Adds a child, replacing any existing child with the same name in place.
    pub fn insert_child(&mut self, child: CodeNode) {
        match self.children.iter_mut().find(|c| c.name == child.name) {
            Some(existing) => *existing = child,
            None => self.children.push(child),
        }
    }

    /// Children in insertion order.
    pub fn children(&self) -> &[CodeNode] {
        &self.children
    }

    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
    }

    pub fn child(&self, name: &str) -> Option<&CodeNode> {
        self.children.iter().find(|c| c.name == name)
    }

    pub fn child_mut(&mut self, name: &str) -> Option<&mut CodeNode> {
        self.children.iter_mut().find(|c| c.name == name)
    }

    /// All nodes of this subtree in depth-first pre-order, starting with `self`.
    pub fn descendants(&self) -> Vec<&CodeNode> {
        let mut out = Vec::new();
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            out.push(node);
            for child in node.children.iter().rev() {
                stack.push(child);
            }
        }
        out
    }

    /// Finds a node anywhere in this subtree by its path.
    pub fn find(&self, path: &str) -> Option<&CodeNode> {
        self.descendants().into_iter().find(|n| n.path == path)
    }

    /// Number of nodes in this subtree, including `self`.
    pub fn len(&self) -> usize {
        1 + self.children.iter().map(CodeNode::len).sum::<usize>()
    }

    /// A node is never empty; provided alongside `len` for clippy.
    pub fn is_empty(&self) -> bool {
        false
    }
}

/// Builds the path of a symbol nested in a file.
pub fn symbol_path(file_path: &str, qualified: &str) -> String {
    format!("{}{}{}", file_path, SYMBOL_SEPARATOR, qualified)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_child_replaces_same_name() {
        let mut file = CodeNode::file("a.py", "a.py");
        file.insert_child(CodeNode::symbol("f", NodeKind::Function, "a.py", "f"));
        file.insert_child(CodeNode::symbol("g", NodeKind::Function, "a.py", "g"));
        file.insert_child(
            CodeNode::symbol("f", NodeKind::Function, "a.py", "f").with_signature("def f(x)"),
        );

        let names: Vec<&str> = file.children().iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["f", "g"]);
        assert_eq!(
            file.child("f").and_then(|f| f.signature.as_deref()),
            Some("def f(x)")
        );
    }

    #[test]
    fn test_descendants_preorder() {
        let root = CodeNode::directory("repo", ".")
            .with_child(
                CodeNode::file("a.py", "a.py")
                    .with_child(CodeNode::symbol("f", NodeKind::Function, "a.py", "f")),
            )
            .with_child(CodeNode::file("b.py", "b.py"));

        let paths: Vec<&str> = root.descendants().iter().map(|n| n.path.as_str()).collect();
        assert_eq!(paths, vec![".", "a.py", "a.py::f", "b.py"]);
        assert_eq!(root.len(), 4);
        assert!(root.find("a.py::f").is_some());
        assert!(root.find("a.py::missing").is_none());
    }

    #[test]
    fn test_kind_classification() {
        assert!(NodeKind::Directory.is_structural());
        assert!(NodeKind::File.is_structural());
        assert!(NodeKind::Method.is_symbol());
        assert_eq!(NodeKind::Variable.to_string(), "variable");
    }
}
