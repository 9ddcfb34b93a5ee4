//! Python analyzer.
//!
//! Walks a tree-sitter syntax tree and extracts classes, functions, methods
//! and module/class level assignments, plus the names each of them mentions
//! in calls, decorators, base classes, annotations, imports and assignment
//! right-hand sides. References are attributed to the innermost enclosing
//! symbol, or to the file for module-level code.

use super::{file_name, Analyzer};
use crate::error::{AnalyzeError, Result};
use crate::node::{symbol_path, CodeNode, NodeKind, Reference};
use std::path::Path;
use tracing::debug;
use tree_sitter::{Node, Parser};

/// Assignment signatures longer than this are cut with an ellipsis.
const MAX_VARIABLE_SIGNATURE_LEN: usize = 160;

/// Analyzer for `.py` and `.pyi` files.
#[derive(Debug, Default, Clone, Copy)]
pub struct PythonAnalyzer;

impl PythonAnalyzer {
    pub fn new() -> Self {
        Self
    }
}

impl Analyzer for PythonAnalyzer {
    fn name(&self) -> &'static str {
        "python"
    }

    fn can_handle(&self, path: &Path) -> bool {
        matches!(
            path.extension().and_then(|e| e.to_str()),
            Some("py") | Some("pyi")
        )
    }

    fn analyze(&self, rel_path: &str, content: &str) -> Result<Vec<CodeNode>> {
        let mut parser = Parser::new();
        parser
            .set_language(&tree_sitter_python::language())
            .map_err(|e| AnalyzeError::Parser(format!("failed to set language: {}", e)))?;

        let tree = parser
            .parse(content, None)
            .ok_or_else(|| AnalyzeError::Parser("tree-sitter returned no tree".into()))?;

        let root = tree.root_node();
        if root.has_error() {
            // Tree-sitter recovers from syntax errors; keep whatever it found.
            debug!(file = rel_path, "syntax errors present, extracting what parsed");
        }

        let extractor = Extractor {
            source: content,
            file_path: rel_path,
        };
        let mut scope = Scope::module(rel_path);
        extractor.visit_scope(root, &mut scope);

        let file = CodeNode::file(file_name(rel_path), rel_path)
            .with_content(content)
            .with_children(scope.children)
            .with_references(scope.references);

        Ok(vec![file])
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Scopes
// ─────────────────────────────────────────────────────────────────────────────

/// A module or class body being collected.
struct Scope {
    /// Qualified name prefix (`None` at module level).
    qualifier: Option<String>,
    /// Path that owns references found directly in this scope.
    owner: String,
    in_class: bool,
    children: Vec<CodeNode>,
    references: Vec<Reference>,
}

impl Scope {
    fn module(file_path: &str) -> Self {
        Self {
            qualifier: None,
            owner: file_path.to_string(),
            in_class: false,
            children: Vec::new(),
            references: Vec::new(),
        }
    }

    fn class(qualified: &str, owner: &str) -> Self {
        Self {
            qualifier: Some(qualified.to_string()),
            owner: owner.to_string(),
            in_class: true,
            children: Vec::new(),
            references: Vec::new(),
        }
    }

    fn qualify(&self, name: &str) -> String {
        match &self.qualifier {
            Some(prefix) => format!("{}.{}", prefix, name),
            None => name.to_string(),
        }
    }

    /// Adds a symbol, replacing an earlier definition with the same name.
    fn push(&mut self, node: CodeNode) {
        match self.children.iter_mut().find(|c| c.name == node.name) {
            Some(existing) => *existing = node,
            None => self.children.push(node),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Extraction
// ─────────────────────────────────────────────────────────────────────────────

struct Extractor<'s> {
    source: &'s str,
    file_path: &'s str,
}

impl<'s> Extractor<'s> {
    fn text(&self, node: Node) -> &'s str {
        node.utf8_text(self.source.as_bytes()).unwrap_or("")
    }

    fn field_text(&self, node: Node, field: &str) -> Option<&'s str> {
        node.child_by_field_name(field).map(|n| self.text(n))
    }

    fn reference(&self, name: &str, owner: &str, at: Node) -> Reference {
        let pos = at.start_position();
        Reference::new(name, owner, pos.row as u32 + 1, pos.column as u32)
    }

    /// Visits the statements of a module, class body or nested block.
    fn visit_scope(&self, container: Node, scope: &mut Scope) {
        for stmt in named_children(container) {
            match stmt.kind() {
                "class_definition" => {
                    let node = self.class_node(stmt, scope, &[]);
                    scope.push(node);
                }
                "function_definition" => {
                    let node = self.function_node(stmt, stmt, scope, &[]);
                    scope.push(node);
                }
                "decorated_definition" => self.visit_decorated(stmt, scope),
                "expression_statement" => self.visit_expression_statement(stmt, scope),
                "import_statement" | "import_from_statement" => {
                    let owner = scope.owner.clone();
                    self.push_import_refs(stmt, &owner, &mut scope.references);
                }
                _ => self.visit_compound(stmt, scope),
            }
        }
    }

    /// Compound statements (`if`, `try`, `with`, ...) keep the enclosing
    /// scope: definitions inside their blocks belong to it.
    fn visit_compound(&self, stmt: Node, scope: &mut Scope) {
        for child in named_children(stmt) {
            if child.kind() == "block" {
                self.visit_scope(child, scope);
            } else if child.kind().ends_with("_clause") {
                self.visit_compound(child, scope);
            } else {
                let owner = scope.owner.clone();
                self.push_usage_refs(child, &owner, &mut scope.references);
            }
        }
    }

    fn visit_decorated(&self, stmt: Node, scope: &mut Scope) {
        let decorators: Vec<Node> = named_children(stmt)
            .into_iter()
            .filter(|c| c.kind() == "decorator")
            .collect();

        let Some(definition) = stmt.child_by_field_name("definition") else {
            return;
        };

        let node = match definition.kind() {
            "class_definition" => self.class_node(definition, scope, &decorators),
            "function_definition" => self.function_node(definition, stmt, scope, &decorators),
            _ => return,
        };
        scope.push(node);
    }

    fn visit_expression_statement(&self, stmt: Node, scope: &mut Scope) {
        let assignment = named_children(stmt)
            .into_iter()
            .next()
            .filter(|c| c.kind() == "assignment");

        let target = assignment.and_then(|a| {
            a.child_by_field_name("left")
                .filter(|left| left.kind() == "identifier")
                .map(|left| (a, self.text(left)))
        });

        match target {
            Some((assignment, name)) => {
                let node = self.variable_node(assignment, name, scope);
                scope.push(node);
            }
            None => {
                let owner = scope.owner.clone();
                self.push_usage_refs(stmt, &owner, &mut scope.references);
            }
        }
    }

    fn class_node(&self, node: Node, scope: &Scope, decorators: &[Node]) -> CodeNode {
        let name = self.field_text(node, "name").unwrap_or("<anonymous>");
        let qualified = scope.qualify(name);
        let path = symbol_path(self.file_path, &qualified);

        let mut references = Vec::new();
        for decorator in decorators {
            self.push_identifiers(*decorator, &path, &mut references);
        }

        let signature = match node.child_by_field_name("superclasses") {
            Some(bases) => {
                self.push_identifiers(bases, &path, &mut references);
                format!("class {}{}", name, collapse_whitespace(self.text(bases)))
            }
            None => format!("class {}", name),
        };

        let mut inner = Scope::class(&qualified, &path);
        let docstring = match node.child_by_field_name("body") {
            Some(body) => {
                self.visit_scope(body, &mut inner);
                self.docstring(body)
            }
            None => None,
        };
        references.append(&mut inner.references);

        let mut class = CodeNode::new(name, NodeKind::Class, path)
            .with_signature(signature)
            .with_references(references)
            .with_children(inner.children);
        class.docstring = docstring;
        class
    }

    fn function_node(
        &self,
        node: Node,
        outer: Node,
        scope: &Scope,
        decorators: &[Node],
    ) -> CodeNode {
        let name = self.field_text(node, "name").unwrap_or("<anonymous>");
        let qualified = scope.qualify(name);
        let path = symbol_path(self.file_path, &qualified);
        let kind = if scope.in_class {
            NodeKind::Method
        } else {
            NodeKind::Function
        };

        let mut references = Vec::new();
        for decorator in decorators {
            self.push_identifiers(*decorator, &path, &mut references);
        }
        if let Some(params) = node.child_by_field_name("parameters") {
            self.push_usage_refs(params, &path, &mut references);
        }
        if let Some(returns) = node.child_by_field_name("return_type") {
            self.push_identifiers(returns, &path, &mut references);
        }

        let body = node.child_by_field_name("body");
        if let Some(body) = body {
            self.push_usage_refs(body, &path, &mut references);
        }

        let mut function = CodeNode::new(name, kind, path)
            .with_signature(self.function_signature(node, name))
            .with_content(self.text(outer))
            .with_references(references);
        function.docstring = body.and_then(|b| self.docstring(b));
        function
    }

    fn variable_node(&self, assignment: Node, name: &str, scope: &Scope) -> CodeNode {
        let qualified = scope.qualify(name);
        let path = symbol_path(self.file_path, &qualified);

        let mut references = Vec::new();
        let mut signature = name.to_string();
        if let Some(annotation) = assignment.child_by_field_name("type") {
            self.push_identifiers(annotation, &path, &mut references);
            signature.push_str(": ");
            signature.push_str(&collapse_whitespace(self.text(annotation)));
        }
        if let Some(value) = assignment.child_by_field_name("right") {
            self.push_identifiers(value, &path, &mut references);
            signature.push_str(" = ");
            signature.push_str(&collapse_whitespace(self.text(value)));
        }

        CodeNode::new(name, NodeKind::Variable, path)
            .with_signature(truncate(signature, MAX_VARIABLE_SIGNATURE_LEN))
            .with_references(references)
    }

    fn function_signature(&self, node: Node, name: &str) -> String {
        let is_async = node
            .child(0)
            .map(|first| first.kind() == "async")
            .unwrap_or(false);
        let params = self
            .field_text(node, "parameters")
            .map(collapse_whitespace)
            .unwrap_or_else(|| "()".to_string());
        let returns = self
            .field_text(node, "return_type")
            .map(|r| format!(" -> {}", collapse_whitespace(r)))
            .unwrap_or_default();

        format!(
            "{}def {}{}{}",
            if is_async { "async " } else { "" },
            name,
            params,
            returns
        )
    }

    /// Returns the cleaned docstring if the first statement of `body` is a
    /// bare string literal.
    fn docstring(&self, body: Node) -> Option<String> {
        let first = named_children(body).into_iter().next()?;
        if first.kind() != "expression_statement" {
            return None;
        }
        let literal = named_children(first).into_iter().next()?;
        if literal.kind() != "string" {
            return None;
        }
        let cleaned = clean_docstring(self.text(literal));
        (!cleaned.is_empty()).then_some(cleaned)
    }

    // ─────────────────────────────────────────────────────────────────────
    // References
    // ─────────────────────────────────────────────────────────────────────

    /// Pushes every identifier under `node`, skipping keyword argument names.
    fn push_identifiers(&self, node: Node, owner: &str, out: &mut Vec<Reference>) {
        match node.kind() {
            "identifier" => out.push(self.reference(self.text(node), owner, node)),
            "keyword_argument" => {
                if let Some(value) = node.child_by_field_name("value") {
                    self.push_identifiers(value, owner, out);
                }
            }
            _ => {
                for child in named_children(node) {
                    self.push_identifiers(child, owner, out);
                }
            }
        }
    }

    /// Walks code collecting names from calls, assignment right-hand sides,
    /// decorators, annotations and imports. Bare identifiers elsewhere are
    /// not references.
    fn push_usage_refs(&self, node: Node, owner: &str, out: &mut Vec<Reference>) {
        match node.kind() {
            // Nested calls are covered by the outer call's identifiers.
            "call" | "decorator" | "type" => self.push_identifiers(node, owner, out),
            "assignment" | "augmented_assignment" => {
                if let Some(annotation) = node.child_by_field_name("type") {
                    self.push_identifiers(annotation, owner, out);
                }
                if let Some(value) = node.child_by_field_name("right") {
                    self.push_identifiers(value, owner, out);
                }
            }
            "import_statement" | "import_from_statement" => {
                self.push_import_refs(node, owner, out)
            }
            _ => {
                for child in named_children(node) {
                    self.push_usage_refs(child, owner, out);
                }
            }
        }
    }

    /// `import a.b` references `a.b`; `from m import x as y` references `x`.
    fn push_import_refs(&self, stmt: Node, owner: &str, out: &mut Vec<Reference>) {
        let mut cursor = stmt.walk();
        let names: Vec<Node> = stmt.children_by_field_name("name", &mut cursor).collect();
        for name in names {
            let target = match name.kind() {
                "aliased_import" => name.child_by_field_name("name"),
                _ => Some(name),
            };
            if let Some(target) = target {
                out.push(Reference::new(
                    self.text(target),
                    owner,
                    stmt.start_position().row as u32 + 1,
                    stmt.start_position().column as u32,
                ));
            }
        }
    }
}

fn named_children(node: Node) -> Vec<Node> {
    let mut cursor = node.walk();
    node.named_children(&mut cursor).collect()
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn truncate(text: String, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text;
    }
    let mut cut: String = text.chars().take(max_chars.saturating_sub(3)).collect();
    cut.push_str("...");
    cut
}

/// Strips string prefixes and quotes, then removes the common indentation
/// of continuation lines and surrounding blank lines.
fn clean_docstring(literal: &str) -> String {
    let unprefixed = literal.trim_start_matches(|c: char| "rRbBuUfF".contains(c));
    let inner = ["\"\"\"", "'''", "\"", "'"]
        .iter()
        .find_map(|q| {
            unprefixed
                .strip_prefix(q)
                .and_then(|s| s.strip_suffix(q))
        })
        .unwrap_or(unprefixed);

    let lines: Vec<&str> = inner.lines().collect();
    let indent = lines
        .iter()
        .skip(1)
        .filter(|l| !l.trim().is_empty())
        .map(|l| l.len() - l.trim_start().len())
        .min()
        .unwrap_or(0);

    let mut cleaned: Vec<String> = Vec::with_capacity(lines.len());
    for (i, line) in lines.iter().enumerate() {
        if i == 0 {
            cleaned.push(line.trim().to_string());
        } else {
            let leading = line.len() - line.trim_start().len();
            let rest = line.get(leading.min(indent)..).unwrap_or(line.trim_start());
            cleaned.push(rest.trim_end().to_string());
        }
    }

    while cleaned.last().map(|l| l.is_empty()).unwrap_or(false) {
        cleaned.pop();
    }
    while cleaned.first().map(|l| l.is_empty()).unwrap_or(false) {
        cleaned.remove(0);
    }
    cleaned.join("\n")
}
