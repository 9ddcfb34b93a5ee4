//! Treeline Core - the repository tree and the analyzers that build it
//!
//! This crate defines the node model every other Treeline crate works on,
//! the assembler that merges per-file results into one tree, and the
//! analyzers that turn source text into nodes with references.
//!
//! # Example
//!
//! ```
//! use treeline_core::{Analyzer, PythonAnalyzer, TreeAssembler};
//!
//! let source = "def helper():\n    pass\n\ndef main():\n    helper()\n";
//! let nodes = PythonAnalyzer::new().analyze("app/main.py", source).unwrap();
//!
//! let mut assembler = TreeAssembler::new("project");
//! assembler.add_file("app/main.py", nodes);
//! let root = assembler.finish();
//!
//! assert!(root.find("app/main.py::helper").is_some());
//! ```

pub mod analyzers;
pub mod error;
pub mod node;
pub mod scored;
pub mod tree;

pub use analyzers::{Analyzer, AnalyzerRegistry, PythonAnalyzer, TextAnalyzer};
pub use error::{AnalyzeError, Result};
pub use node::{symbol_path, CodeNode, NodeKind, Reference, SYMBOL_SEPARATOR};
pub use scored::{ScoredTree, Scores};
pub use tree::{TreeAssembler, ROOT_PATH};
