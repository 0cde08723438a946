//! Symbol table for cross-file name resolution

use crate::model::{NodeId, NodeKind};
use dashmap::DashMap;

/// A declaration as seen by the resolver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Symbol {
    pub id: NodeId,
    pub kind: NodeKind,
    pub file_path: String,
}

/// Symbol table mapping declared names to node ids. Thread-safe for concurrent access.
pub struct SymbolTable {
    symbols: DashMap<String, Vec<Symbol>>,
    /// File path -> name of its default export, if any
    default_exports: DashMap<String, String>,
}

impl SymbolTable {
    pub fn new() -> Self {
        SymbolTable {
            symbols: DashMap::new(),
            default_exports: DashMap::new(),
        }
    }

    /// Insert a symbol under the name it is referenced by.
    pub fn insert(&self, name: &str, id: NodeId, kind: NodeKind, file_path: &str) {
        self.symbols.entry(name.to_string()).or_default().push(Symbol {
            id,
            kind,
            file_path: file_path.to_string(),
        });
    }

    pub fn set_default_export(&self, file_path: &str, name: &str) {
        self.default_exports
            .insert(file_path.to_string(), name.to_string());
    }

    pub fn default_export(&self, file_path: &str) -> Option<String> {
        self.default_exports.get(file_path).map(|r| r.value().clone())
    }

    /// All declarations with this name, in insertion order.
    pub fn lookup(&self, name: &str) -> Vec<Symbol> {
        self.symbols
            .get(name)
            .map(|r| r.value().clone())
            .unwrap_or_default()
    }

    /// The declaration of `name` inside `file_path`.
    pub fn lookup_in_file(&self, name: &str, file_path: &str) -> Option<Symbol> {
        self.symbols
            .get(name)?
            .value()
            .iter()
            .find(|s| s.file_path == file_path)
            .cloned()
    }
}

impl Default for SymbolTable {
    fn default() -> Self {
        Self::new()
    }
}
