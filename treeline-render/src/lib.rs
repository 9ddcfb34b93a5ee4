//! Treeline Render - budget-aware serialization of scored trees
//!
//! Every format shares one depth-first traversal. Nodes are filtered by
//! depth and importance, siblings are ordered by importance, and the output
//! is cut off once the size budget is spent. Only the line formatting differs
//! between [`Format::Tree`], [`Format::Compact`] and [`Format::Headed`].
//!
//! # Example
//!
//! ```
//! use treeline_core::{CodeNode, NodeKind, ScoredTree, Scores};
//! use treeline_render::{DetailLevel, Format, RenderOptions, Serializer};
//!
//! let root = CodeNode::directory("repo", ".").with_child(
//!     CodeNode::file("app.py", "app.py").with_child(
//!         CodeNode::symbol("main", NodeKind::Function, "app.py", "main")
//!             .with_signature("def main()"),
//!     ),
//! );
//! let scores = Scores::new();
//! let tree = ScoredTree::new(&root, &scores);
//!
//! let text = Serializer::new(Format::Compact)
//!     .serialize(&tree, &RenderOptions::new(DetailLevel::Signatures));
//! assert_eq!(text, "repo/\n  app.py\n    def main()");
//! ```

mod budget;
mod estimate;
mod format;
mod options;
mod serializer;

pub use budget::Budget;
pub use estimate::{CharEstimator, SizeEstimator};
pub use format::Format;
pub use options::{DetailLevel, RenderOptions};
pub use serializer::{is_included, Serializer, HIDE_BELOW_DEPTH, HIGH_IMPORTANCE, LOW_IMPORTANCE};
