//! Line formatting for the three output formats.
//!
//! The traversal in `serializer` is shared. This module only decides what a
//! header or a detail block looks like for a given node and position.

use crate::options::DetailLevel;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use treeline_core::{CodeNode, NodeKind, SYMBOL_SEPARATOR};

/// Output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Format {
    /// Box-drawing connectors (`├──`, `└──`, `│`).
    Tree,
    /// Two-space indentation.
    Compact,
    /// Markdown headings with kind glyphs and fenced code.
    #[default]
    Headed,
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Tree => "tree",
            Self::Compact => "compact",
            Self::Headed => "headed",
        };
        write!(f, "{}", s)
    }
}

impl FromStr for Format {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "tree" => Ok(Self::Tree),
            "compact" => Ok(Self::Compact),
            "headed" | "markdown" | "md" => Ok(Self::Headed),
            other => Err(format!(
                "unknown format '{other}' (expected tree, compact or headed)"
            )),
        }
    }
}

/// Optional per-node blocks rendered below the header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Block {
    Signature,
    Doc,
    Body,
}

impl Format {
    /// Whether signatures are rendered as their own block instead of
    /// replacing the name on the header line.
    pub(crate) fn has_signature_block(self) -> bool {
        match self {
            Self::Tree | Self::Compact => false,
            Self::Headed => true,
        }
    }

    /// The header line of `node`.
    ///
    /// `lineage` holds, for every level below the root down to `node`,
    /// whether that ancestor was the last visible sibling.
    pub(crate) fn header(self, node: &CodeNode, lineage: &[bool], detail: DetailLevel) -> String {
        match self {
            Self::Tree => format!("{}{}", tree_prefix(lineage), plain_label(node, detail)),
            Self::Compact => format!("{}{}", indent(lineage.len()), plain_label(node, detail)),
            Self::Headed => headed_header(node, lineage.len()),
        }
    }

    /// A multi-line block attached to `node`.
    pub(crate) fn block(self, node: &CodeNode, lineage: &[bool], block: Block, text: &str) -> String {
        match self {
            Self::Tree => prefixed(&tree_continuation(lineage), text),
            Self::Compact => prefixed(&indent(lineage.len() + 1), text),
            Self::Headed => match block {
                Block::Doc => quoted(text),
                Block::Signature | Block::Body => fenced(text, language(&node.path)),
            },
        }
    }

    /// Rewrites the lines of a subtree already emitted so that its branch at
    /// `column` ends there: the header connector becomes `└──` and the
    /// vertical bars below it are cleared.
    pub(crate) fn close_branch(self, pieces: &mut [String], column: usize) {
        match self {
            Self::Tree => {
                for (i, piece) in pieces.iter_mut().enumerate() {
                    *piece = piece
                        .lines()
                        .enumerate()
                        .map(|(j, line)| match (i, j) {
                            (0, 0) => replace_at(line, column * 4, '├', '└'),
                            _ => replace_at(line, column * 4, '│', ' '),
                        })
                        .collect::<Vec<_>>()
                        .join("\n");
                }
            }
            Self::Compact | Self::Headed => {}
        }
    }
}

fn replace_at(line: &str, at: usize, from: char, to: char) -> String {
    let replaced: String = line
        .chars()
        .enumerate()
        .map(|(k, c)| if k == at && c == from { to } else { c })
        .collect();
    replaced.trim_end().to_string()
}

fn plain_label(node: &CodeNode, detail: DetailLevel) -> String {
    match node.kind {
        NodeKind::Directory => directory_label(node),
        NodeKind::File => node.name.clone(),
        NodeKind::Class | NodeKind::Function | NodeKind::Method | NodeKind::Variable => {
            symbol_label(node, detail)
        }
    }
}

fn directory_label(node: &CodeNode) -> String {
    format!("{}/", node.name)
}

fn symbol_label(node: &CodeNode, detail: DetailLevel) -> String {
    match &node.signature {
        Some(signature) if detail >= DetailLevel::Signatures => collapse_whitespace(signature),
        _ => node.name.clone(),
    }
}

fn headed_header(node: &CodeNode, depth: usize) -> String {
    let hashes = "#".repeat((depth + 1).min(6));
    let label = match node.kind {
        NodeKind::Directory => directory_label(node),
        _ => node.name.clone(),
    };
    format!("{} {} {}", hashes, glyph(node.kind), label)
}

fn glyph(kind: NodeKind) -> &'static str {
    match kind {
        NodeKind::Directory => "📁",
        NodeKind::File => "📄",
        NodeKind::Class => "🔷",
        NodeKind::Function | NodeKind::Method => "🔸",
        NodeKind::Variable => "📎",
    }
}

fn tree_prefix(lineage: &[bool]) -> String {
    let Some((last, ancestors)) = lineage.split_last() else {
        return String::new();
    };
    let mut prefix = tree_continuation(ancestors);
    prefix.push_str(if *last { "└── " } else { "├── " });
    prefix
}

fn tree_continuation(lineage: &[bool]) -> String {
    lineage
        .iter()
        .map(|&last| if last { "    " } else { "│   " })
        .collect()
}

fn indent(depth: usize) -> String {
    "  ".repeat(depth)
}

fn prefixed(prefix: &str, text: &str) -> String {
    text.lines()
        .map(|line| format!("{}{}", prefix, line).trim_end().to_string())
        .collect::<Vec<_>>()
        .join("\n")
}

fn quoted(text: &str) -> String {
    text.lines()
        .map(|line| format!("> {}", line).trim_end().to_string())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Wraps `text` in a fence longer than any backtick run inside it.
fn fenced(text: &str, language: &str) -> String {
    let longest = text
        .split(|c: char| c != '`')
        .map(str::len)
        .max()
        .unwrap_or(0);
    let fence = "`".repeat(longest.max(2) + 1);
    format!("{fence}{language}\n{}\n{fence}", text.trim_end_matches('\n'))
}

/// Fence language tag derived from the file extension of a node path.
pub(crate) fn language(path: &str) -> &'static str {
    let file = path.split(SYMBOL_SEPARATOR).next().unwrap_or(path);
    let name = file.rsplit('/').next().unwrap_or(file);
    let Some((_, extension)) = name.rsplit_once('.') else {
        return "";
    };
    match extension.to_ascii_lowercase().as_str() {
        "py" | "pyi" => "python",
        "rs" => "rust",
        "js" | "mjs" | "cjs" => "javascript",
        "ts" | "tsx" => "typescript",
        "go" => "go",
        "java" => "java",
        "c" | "h" => "c",
        "cpp" | "cc" | "hpp" => "cpp",
        "md" => "markdown",
        "toml" => "toml",
        "json" => "json",
        "yaml" | "yml" => "yaml",
        "sh" | "bash" => "bash",
        "html" => "html",
        "css" => "css",
        "sql" => "sql",
        _ => "",
    }
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn method() -> CodeNode {
        CodeNode::symbol("run", NodeKind::Method, "pkg/svc.py", "Service.run")
            .with_signature("def run(self,\n        n: int) -> bool")
    }

    #[test]
    fn test_tree_connectors() {
        assert_eq!(tree_prefix(&[]), "");
        assert_eq!(tree_prefix(&[false]), "├── ");
        assert_eq!(tree_prefix(&[true]), "└── ");
        assert_eq!(tree_prefix(&[false, true]), "│   └── ");
        assert_eq!(tree_prefix(&[true, false]), "    ├── ");
    }

    #[test]
    fn test_close_branch() {
        let mut pieces = vec![
            "│   ├── svc.py".to_string(),
            "│   │   Runs jobs.\n│   │\n│   │   Twice.".to_string(),
            "│   │   └── run".to_string(),
        ];
        Format::Tree.close_branch(&mut pieces, 1);
        assert_eq!(
            pieces,
            vec!["│   └── svc.py", "│       Runs jobs.\n│\n│       Twice.", "│       └── run"]
        );

        let mut compact = vec!["  svc.py".to_string()];
        Format::Compact.close_branch(&mut compact, 0);
        assert_eq!(compact, vec!["  svc.py"]);
    }

    #[test]
    fn test_symbol_label_respects_detail() {
        let node = method();
        assert_eq!(
            Format::Tree.header(&node, &[true], DetailLevel::Signatures),
            "└── def run(self, n: int) -> bool"
        );
        assert_eq!(Format::Compact.header(&node, &[true, true], DetailLevel::Structure), "    run");
    }

    #[test]
    fn test_headed_header() {
        let dir = CodeNode::directory("pkg", "pkg");
        assert_eq!(Format::Headed.header(&dir, &[false], DetailLevel::Structure), "## 📁 pkg/");

        let deep = [true; 9];
        assert_eq!(
            Format::Headed.header(&method(), &deep, DetailLevel::FullCode),
            "###### 🔸 run"
        );
    }

    #[test]
    fn test_fences_outlast_inner_backticks() {
        let block = fenced("x = '```'", "python");
        assert!(block.starts_with("````python\n"));
        assert!(block.ends_with("\n````"));

        assert_eq!(fenced("pass\n", "python"), "```python\npass\n```");
    }

    #[test]
    fn test_language_from_path() {
        assert_eq!(language("pkg/svc.py::Service.run"), "python");
        assert_eq!(language("README.md"), "markdown");
        assert_eq!(language("v1.2/Makefile"), "");
    }

    #[test]
    fn test_blocks_are_prefixed() {
        let node = method();
        let block = Format::Tree.block(&node, &[false, true], Block::Doc, "Runs it.\n\nTwice.");
        assert_eq!(block, "│       Runs it.\n│\n│       Twice.");

        let quoted = Format::Headed.block(&node, &[], Block::Doc, "Runs it.\n\nTwice.");
        assert_eq!(quoted, "> Runs it.\n>\n> Twice.");
    }

    #[test]
    fn test_format_parsing() {
        assert_eq!("markdown".parse::<Format>(), Ok(Format::Headed));
        assert_eq!("Tree".parse::<Format>(), Ok(Format::Tree));
        assert!("xml".parse::<Format>().is_err());
        assert_eq!(Format::default(), Format::Headed);
    }
}
