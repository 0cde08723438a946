//! Language extractors for the ECMAScript family

pub mod ecmascript;
pub mod javascript;
pub mod typescript;

use std::path::Path;

use anyhow::Result;
use mindmap_core::CodeNode;

use crate::parser_pool::{FileType, ParserPool};

/// What a reference in source text looks like, before it is resolved to a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ReferenceKind {
    /// `foo(...)` or `new Foo(...)`
    Call,
    /// `useFoo(...)`
    Hook,
    /// `<Foo />`
    Jsx,
    /// `Foo` in a type position
    Type,
    /// Any other identifier read
    Value,
    /// A database client read naming a table
    DbRead,
    /// A database client write naming a table
    DbWrite,
}

/// An unresolved use of `name` by the declaration `owner` (or by the file itself when `None`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reference {
    pub owner: Option<String>,
    pub name: String,
    pub kind: ReferenceKind,
    pub line: u32,
}

/// One name bound by an import: `imported` is `default`, `*`, or the exported name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportBinding {
    pub imported: String,
    pub local: String,
}

/// An `import ... from "source"` or `export ... from "source"` statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportDecl {
    pub source: String,
    pub line: u32,
    pub bindings: Vec<ImportBinding>,
}

/// Everything learned from one file, with node ids already derived from its path.
#[derive(Debug, Clone, Default)]
pub struct FileExtraction {
    pub path: String,
    pub lines_of_code: u32,
    pub declarations: Vec<CodeNode>,
    pub imports: Vec<ImportDecl>,
    pub references: Vec<Reference>,
    pub exports: Vec<String>,
    pub default_export: Option<String>,
    /// Tree-sitter had to recover from a syntax error somewhere in the file.
    pub has_errors: bool,
}

/// Trait for language-specific symbol extractors
pub trait LanguageExtractor: Send + Sync {
    /// Extract declarations and unresolved references from one file.
    fn extract(&self, rel_path: &str, source: &str) -> Result<FileExtraction>;
}

/// Get the appropriate extractor for a file based on its extension
pub fn get_extractor(path: &Path, parser_pool: &ParserPool) -> Option<Box<dyn LanguageExtractor>> {
    match FileType::from_path(path)? {
        FileType::TypeScript | FileType::Tsx => Some(Box::new(typescript::TypeScriptExtractor::new(
            parser_pool.clone(),
        ))),
        FileType::JavaScript => Some(Box::new(javascript::JavaScriptExtractor::new(
            parser_pool.clone(),
        ))),
    }
}
