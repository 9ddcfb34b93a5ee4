//! The shared budget-aware traversal.

use crate::budget::Budget;
use crate::estimate::{CharEstimator, SizeEstimator};
use crate::format::{Block, Format};
use crate::options::{DetailLevel, RenderOptions};
use tracing::debug;
use treeline_core::{CodeNode, NodeKind, ScoredTree};

/// Nodes above this importance are always shown.
pub const HIGH_IMPORTANCE: f64 = 0.7;

/// Symbols below this importance are hidden deeper than [`HIDE_BELOW_DEPTH`].
pub const LOW_IMPORTANCE: f64 = 0.3;

pub const HIDE_BELOW_DEPTH: usize = 2;

/// Whether a node at `depth` is rendered at all.
pub fn is_included(kind: NodeKind, importance: f64, depth: usize, max_depth: Option<usize>) -> bool {
    if max_depth.is_some_and(|max| depth > max) {
        return false;
    }
    if kind.is_structural() || importance > HIGH_IMPORTANCE {
        return true;
    }
    !(depth > HIDE_BELOW_DEPTH && importance < LOW_IMPORTANCE)
}

/// Renders a scored tree in one format under an optional size budget.
pub struct Serializer {
    format: Format,
    estimator: Box<dyn SizeEstimator + Send + Sync>,
}

impl std::fmt::Debug for Serializer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Serializer")
            .field("format", &self.format)
            .finish_non_exhaustive()
    }
}

impl Serializer {
    /// Creates a serializer that measures output with [`CharEstimator`].
    pub fn new(format: Format) -> Self {
        Self::with_estimator(format, CharEstimator)
    }

    pub fn with_estimator(format: Format, estimator: impl SizeEstimator + Send + Sync + 'static) -> Self {
        Self {
            format,
            estimator: Box::new(estimator),
        }
    }

    pub fn format(&self) -> Format {
        self.format
    }

    /// Size of `text` as measured by this serializer's estimator.
    pub fn estimate(&self, text: &str) -> usize {
        self.estimator.estimate(text)
    }

    /// Renders `tree` depth-first from its root.
    ///
    /// With a token limit the output never exceeds it; every line after the
    /// first is charged together with its joining newline. A node's header is
    /// written only if it leaves budget to spare; once the budget runs out
    /// nothing further is written and the last written branch is closed.
    pub fn serialize(&self, tree: &ScoredTree<'_>, options: &RenderOptions) -> String {
        let mut out = Vec::new();
        let root = tree.root();
        let budget = Budget::from_limit(options.token_limit);

        let left = if is_included(root.kind, tree.importance(root), 0, options.max_depth) {
            let mut lineage = Vec::new();
            self.visit(tree, root, &mut lineage, options, &mut out, budget)
        } else {
            budget
        };

        debug!(
            format = %self.format,
            lines = out.len(),
            remaining = ?left.remaining(),
            "serialized tree"
        );
        out.join("\n")
    }

    fn visit(
        &self,
        tree: &ScoredTree<'_>,
        node: &CodeNode,
        lineage: &mut Vec<bool>,
        options: &RenderOptions,
        out: &mut Vec<String>,
        budget: Budget,
    ) -> Budget {
        let header = self.format.header(node, lineage, options.detail);
        let size = self.charge(out, &header);
        if !budget.admits(size) {
            return budget.exhaust();
        }
        out.push(header);
        let mut budget = budget.spend(size);

        budget = self.emit_blocks(node, lineage, options.detail, out, budget);

        let children = visible_children(tree, node, lineage.len() + 1, options.max_depth);
        let count = children.len();
        let column = lineage.len();
        for (i, child) in children.iter().enumerate() {
            if budget.is_exhausted() {
                break;
            }
            let start = out.len();
            lineage.push(i + 1 == count);
            budget = self.visit(tree, child, lineage, options, out, budget);
            lineage.pop();

            // The next sibling is cut off, so this one closes the branch.
            if let Some(next) = children.get(i + 1) {
                lineage.push(i + 2 == count);
                let header = self.format.header(next, lineage, options.detail);
                lineage.pop();
                if !budget.admits(self.charge(out, &header)) {
                    if out.len() > start {
                        self.format.close_branch(&mut out[start..], column);
                    }
                    return budget.exhaust();
                }
            }
        }
        budget
    }

    /// Size of `piece` plus the newline that joins it to earlier output.
    fn charge(&self, out: &[String], piece: &str) -> usize {
        if out.is_empty() {
            self.estimate(piece)
        } else {
            self.estimate(&format!("\n{piece}"))
        }
    }

    /// Emits the optional blocks of `node` that the detail level asks for and
    /// the budget covers.
    fn emit_blocks(
        &self,
        node: &CodeNode,
        lineage: &[bool],
        detail: DetailLevel,
        out: &mut Vec<String>,
        mut budget: Budget,
    ) -> Budget {
        if detail >= DetailLevel::FullCode && shows_body(node) {
            if let Some(body) = non_blank(node.content.as_deref()) {
                let block = self.format.block(node, lineage, Block::Body, body);
                let size = self.charge(out, &block);
                if budget.fits(size) {
                    out.push(block);
                    return budget.spend(size);
                }
            }
        }

        if detail >= DetailLevel::Signatures
            && node.kind.is_symbol()
            && self.format.has_signature_block()
        {
            if let Some(signature) = non_blank(node.signature.as_deref()) {
                budget = self.try_block(node, lineage, Block::Signature, signature, out, budget);
            }
        }

        if detail >= DetailLevel::Docstrings {
            if let Some(doc) = non_blank(node.docstring.as_deref()) {
                budget = self.try_block(node, lineage, Block::Doc, doc, out, budget);
            }
        }
        budget
    }

    fn try_block(
        &self,
        node: &CodeNode,
        lineage: &[bool],
        kind: Block,
        text: &str,
        out: &mut Vec<String>,
        budget: Budget,
    ) -> Budget {
        let block = self.format.block(node, lineage, kind, text);
        let size = self.charge(out, &block);
        if !budget.fits(size) {
            return budget;
        }
        out.push(block);
        budget.spend(size)
    }
}

/// Directories have no body. Files with analyzed children show those instead.
fn shows_body(node: &CodeNode) -> bool {
    match node.kind {
        NodeKind::Directory => false,
        NodeKind::File => !node.has_children(),
        NodeKind::Class | NodeKind::Function | NodeKind::Method | NodeKind::Variable => true,
    }
}

fn non_blank(text: Option<&str>) -> Option<&str> {
    text.filter(|t| !t.trim().is_empty())
}

/// Included children of `node`, most important first, ties by name.
fn visible_children<'a>(
    tree: &ScoredTree<'_>,
    node: &'a CodeNode,
    depth: usize,
    max_depth: Option<usize>,
) -> Vec<&'a CodeNode> {
    let mut children: Vec<(&CodeNode, f64)> = node
        .children()
        .iter()
        .map(|child| (child, tree.importance(child)))
        .filter(|(child, importance)| is_included(child.kind, *importance, depth, max_depth))
        .collect();
    children.sort_by(|(a, ia), (b, ib)| ib.total_cmp(ia).then_with(|| a.name.cmp(&b.name)));
    children.into_iter().map(|(child, _)| child).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use treeline_core::Scores;

    fn sample() -> CodeNode {
        let svc = CodeNode::file("svc.py", "pkg/svc.py").with_child(
            CodeNode::symbol("Service", NodeKind::Class, "pkg/svc.py", "Service")
                .with_signature("class Service")
                .with_docstring("Runs jobs.")
                .with_content("class Service:\n    \"\"\"Runs jobs.\"\"\"\n    pass")
                .with_child(
                    CodeNode::symbol("run", NodeKind::Method, "pkg/svc.py", "Service.run")
                        .with_signature("def run(self)"),
                ),
        );
        let util = CodeNode::file("util.py", "pkg/util.py").with_child(
            CodeNode::symbol("helper", NodeKind::Function, "pkg/util.py", "helper")
                .with_signature("def helper()"),
        );
        let pkg = CodeNode::directory("pkg", "pkg").with_children([svc, util]);
        CodeNode::directory("repo", ".")
            .with_child(pkg)
            .with_child(CodeNode::file("README.md", "README.md").with_content("# Repo"))
    }

    fn scores(pairs: &[(&str, f64)]) -> Scores {
        pairs.iter().map(|(p, s)| (p.to_string(), *s)).collect()
    }

    #[test]
    fn test_inclusion_predicate() {
        assert!(is_included(NodeKind::File, 0.0, 9, None));
        assert!(!is_included(NodeKind::File, 1.0, 3, Some(2)));
        assert!(is_included(NodeKind::Method, 0.8, 5, None));
        assert!(!is_included(NodeKind::Method, 0.1, 3, None));
        assert!(is_included(NodeKind::Method, 0.1, 2, None));
        assert!(is_included(NodeKind::Method, 0.5, 4, None));
    }

    #[test]
    fn test_tree_format_unlimited() {
        let root = sample();
        let scores = scores(&[
            ("pkg/svc.py::Service", 0.9),
            ("pkg/svc.py::Service.run", 0.8),
            ("pkg/util.py::helper", 0.8),
            ("pkg/util.py", 0.5),
        ]);
        let tree = ScoredTree::new(&root, &scores);

        let text = Serializer::new(Format::Tree).serialize(&tree, &RenderOptions::default());
        let expected = "\
repo/
├── README.md
└── pkg/
    ├── util.py
    │   └── def helper()
    └── svc.py
        └── class Service
            └── def run(self)";
        assert_eq!(text, expected);
    }

    #[test]
    fn test_siblings_ordered_by_importance_then_name() {
        let root = CodeNode::directory("repo", ".").with_children([
            CodeNode::file("b.py", "b.py"),
            CodeNode::file("c.py", "c.py"),
            CodeNode::file("a.py", "a.py"),
            CodeNode::file("d.py", "d.py"),
        ]);
        let scores = scores(&[("c.py", 0.9), ("b.py", 0.4), ("a.py", 0.4)]);
        let tree = ScoredTree::new(&root, &scores);

        let text = Serializer::new(Format::Compact).serialize(&tree, &RenderOptions::default());
        assert_eq!(text, "repo/\n  c.py\n  a.py\n  b.py\n  d.py");
    }

    #[test]
    fn test_low_importance_symbols_hidden_when_deep() {
        let root = sample();
        let scores = scores(&[("pkg/svc.py::Service", 0.9)]);
        let tree = ScoredTree::new(&root, &scores);

        let text = Serializer::new(Format::Compact)
            .serialize(&tree, &RenderOptions::new(DetailLevel::Structure));
        assert!(text.contains("Service"));
        assert!(!text.contains("helper"));
        assert!(!text.contains("run"));
    }

    #[test]
    fn test_max_depth_cuts_everything_below() {
        let root = sample();
        let scores = scores(&[("pkg/svc.py::Service", 1.0)]);
        let tree = ScoredTree::new(&root, &scores);

        let options = RenderOptions::default().with_max_depth(Some(1));
        let text = Serializer::new(Format::Compact).serialize(&tree, &options);
        assert_eq!(text, "repo/\n  README.md\n  pkg/");
    }

    #[test]
    fn test_zero_budget_renders_nothing() {
        let root = sample();
        let scores = Scores::new();
        let tree = ScoredTree::new(&root, &scores);

        for format in [Format::Tree, Format::Compact, Format::Headed] {
            let options = RenderOptions::default().with_token_limit(Some(0));
            assert_eq!(Serializer::new(format).serialize(&tree, &options), "");
        }
    }

    #[test]
    fn test_budget_is_never_exceeded() {
        let root = sample();
        let scores = scores(&[("pkg/svc.py::Service", 0.9), ("pkg/util.py::helper", 0.8)]);
        let tree = ScoredTree::new(&root, &scores);
        let count = |s: &str| s.chars().count();

        for limit in [1, 5, 12, 30, 80, 500] {
            let serializer = Serializer::with_estimator(Format::Tree, count);
            let options = RenderOptions::new(DetailLevel::FullCode).with_token_limit(Some(limit));
            let text = serializer.serialize(&tree, &options);
            let used = serializer.estimate(&text);
            assert!(used <= limit, "limit {limit} used {used}");
        }
    }

    #[test]
    fn test_headed_respects_budget() {
        let root = sample();
        let scores = scores(&[("pkg/svc.py::Service", 0.9), ("pkg/util.py::helper", 0.8)]);
        let tree = ScoredTree::new(&root, &scores);
        let count = |s: &str| s.chars().count();
        let serializer = Serializer::with_estimator(Format::Headed, count);

        for limit in [2, 8, 16, 32, 64, 128, 256] {
            let options = RenderOptions::new(DetailLevel::Docstrings).with_token_limit(Some(limit));
            let text = serializer.serialize(&tree, &options);
            let used = serializer.estimate(&text);
            assert!(used <= limit, "limit {limit} used {used}");
        }
    }

    #[test]
    fn test_joining_newlines_are_charged() {
        let files = ('a'..='z').map(|c| {
            let name = format!("{c}{c}");
            CodeNode::file(name.clone(), name)
        });
        let root = CodeNode::directory("abc", ".").with_children(files);
        let scores = Scores::new();
        let tree = ScoredTree::new(&root, &scores);
        let serializer = Serializer::new(Format::Compact);

        // "abc/" costs 1 and every "\n  xx" costs 2
        let options = RenderOptions::default().with_token_limit(Some(20));
        let text = serializer.serialize(&tree, &options);
        assert_eq!(text.lines().count(), 10);
        assert!(serializer.estimate(&text) <= 20);
    }

    #[test]
    fn test_truncated_siblings_close_the_branch() {
        let root = CodeNode::directory("repo", ".").with_children(
            ["a.py", "b.py", "c.py", "d.py"].map(|name| CodeNode::file(name, name)),
        );
        let scores = Scores::new();
        let tree = ScoredTree::new(&root, &scores);
        let serializer = Serializer::with_estimator(Format::Tree, |s: &str| s.chars().count());

        // "repo/" costs 5 and every "\n├── x.py" costs 9
        let options = RenderOptions::default().with_token_limit(Some(30));
        let text = serializer.serialize(&tree, &options);
        assert_eq!(text, "repo/\n├── a.py\n└── b.py");
    }

    #[test]
    fn test_truncated_output_leaves_no_open_branches() {
        let root = sample();
        let scores = scores(&[("pkg/svc.py::Service", 0.9), ("pkg/util.py::helper", 0.8)]);
        let tree = ScoredTree::new(&root, &scores);
        let serializer = Serializer::with_estimator(Format::Tree, |s: &str| s.chars().count());

        for limit in 1..160 {
            let options = RenderOptions::new(DetailLevel::Docstrings).with_token_limit(Some(limit));
            let text = serializer.serialize(&tree, &options);
            let last = text.lines().last().unwrap_or_default();
            assert!(
                !last.contains('├') && !last.contains('│'),
                "open branch at {limit}:\n{text}"
            );
            assert!(serializer.estimate(&text) <= limit);
        }
    }

    #[test]
    fn test_directory_emitted_while_budget_remains() {
        let root = CodeNode::directory("repo", ".")
            .with_child(CodeNode::directory("empty", "empty"));
        let scores = Scores::new();
        let tree = ScoredTree::new(&root, &scores);

        // "repo/" costs 2 and "\n└── empty/" costs 3
        let options = RenderOptions::default().with_token_limit(Some(6));
        let text = Serializer::new(Format::Tree).serialize(&tree, &options);
        assert_eq!(text, "repo/\n└── empty/");

        let options = RenderOptions::default().with_token_limit(Some(5));
        let text = Serializer::new(Format::Tree).serialize(&tree, &options);
        assert_eq!(text, "repo/");
    }

    #[test]
    fn test_full_code_degrades_to_docstring() {
        let root = CodeNode::file("svc.py", "svc.py").with_child(
            CodeNode::symbol("Service", NodeKind::Class, "svc.py", "Service")
                .with_docstring("Runs jobs.")
                .with_content("class Service:\n".to_string() + &"    x = 1\n".repeat(40)),
        );
        let scores = scores(&[("svc.py::Service", 1.0)]);
        let tree = ScoredTree::new(&root, &scores);

        let options = RenderOptions::new(DetailLevel::FullCode).with_token_limit(Some(20));
        let text = Serializer::new(Format::Compact).serialize(&tree, &options);
        assert_eq!(text, "svc.py\n  Service\n    Runs jobs.");
    }

    #[test]
    fn test_files_with_children_hide_their_content() {
        let root = CodeNode::file("svc.py", "svc.py")
            .with_content("import os")
            .with_child(CodeNode::symbol("x", NodeKind::Variable, "svc.py", "x"));
        let scores = scores(&[("svc.py::x", 1.0)]);
        let tree = ScoredTree::new(&root, &scores);

        let text = Serializer::new(Format::Compact)
            .serialize(&tree, &RenderOptions::new(DetailLevel::FullCode));
        assert!(!text.contains("import os"));
    }

    #[test]
    fn test_headed_fences_are_closed() {
        let root = sample();
        let scores = scores(&[("pkg/svc.py::Service", 0.9), ("pkg/svc.py::Service.run", 0.9)]);
        let tree = ScoredTree::new(&root, &scores);
        let serializer = Serializer::new(Format::Headed);

        for limit in [None, Some(10), Some(25), Some(40), Some(60)] {
            let options = RenderOptions::new(DetailLevel::FullCode).with_token_limit(limit);
            let text = serializer.serialize(&tree, &options);
            let fences = text.lines().filter(|l| l.starts_with("```")).count();
            assert_eq!(fences % 2, 0, "unbalanced fences at {limit:?}:\n{text}");
        }

        let text = serializer.serialize(&tree, &RenderOptions::new(DetailLevel::FullCode));
        assert!(text.starts_with("# 📁 repo/\n"));
        assert!(text.contains("#### 🔷 Service\n```python\nclass Service:"));
        assert!(text.contains("# 📄 README.md\n```markdown\n# Repo\n```"));
    }

    #[test]
    fn test_deterministic_output() {
        let root = sample();
        let scores = scores(&[("pkg/svc.py", 0.5), ("pkg/util.py", 0.5)]);
        let tree = ScoredTree::new(&root, &scores);
        let serializer = Serializer::new(Format::Tree);
        let options = RenderOptions::new(DetailLevel::Docstrings).with_token_limit(Some(40));

        assert_eq!(serializer.serialize(&tree, &options), serializer.serialize(&tree, &options));
    }
}
