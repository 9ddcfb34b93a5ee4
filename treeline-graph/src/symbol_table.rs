use crate::graph::VertexId;
use std::collections::HashMap;

/// Maps local symbol names to the vertices that define them.
///
/// Several nodes may share a name (`__init__`, `run`, `utils.py`). The
/// candidates for a name are kept sorted by path so resolution never
/// depends on insertion order.
#[derive(Debug, Default, Clone)]
pub struct SymbolTable {
    by_name: HashMap<String, Vec<(String, VertexId)>>,
}

impl SymbolTable {
    /// Creates a new empty symbol table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers the node at `path` under its local `name`.
    pub fn insert(&mut self, name: &str, path: &str, id: VertexId) {
        let candidates = self.by_name.entry(name.to_string()).or_default();
        if candidates.iter().any(|(_, existing)| *existing == id) {
            return;
        }
        let at = candidates.partition_point(|(p, _)| p.as_str() < path);
        candidates.insert(at, (path.to_string(), id));
    }

    /// Every vertex defining `name`, ordered by path.
    pub fn resolve(&self, name: &str) -> Vec<VertexId> {
        self.by_name
            .get(name)
            .map(|c| c.iter().map(|(_, id)| *id).collect())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_resolve() {
        let mut table = SymbolTable::new();
        let id = VertexId::new(1);

        table.insert("foo", "main.py::foo", id);

        assert_eq!(table.resolve("foo"), vec![id]);
        assert!(table.resolve("bar").is_empty());
    }

    #[test]
    fn test_candidates_sorted_by_path() {
        let mut table = SymbolTable::new();
        table.insert("run", "z.py::run", VertexId::new(0));
        table.insert("run", "a.py::run", VertexId::new(1));
        table.insert("run", "m.py::run", VertexId::new(2));
        table.insert("run", "a.py::run", VertexId::new(1));

        assert_eq!(
            table.resolve("run"),
            vec![VertexId::new(1), VertexId::new(2), VertexId::new(0)]
        );
    }
}
